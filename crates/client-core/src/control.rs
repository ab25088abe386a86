//! # Embedded control messages
//!
//! The gateway coordinates call ownership through small XML documents that
//! travel in the `P-rc` header of an INVITE and in the body of `MESSAGE`
//! requests (`Content-Type: x-rc/agent`):
//!
//! ```text
//! <Msg>
//!   <Hdr SID="35888" Req="{A1}" From="#1337@sip.example.com" To="101" Cmd="6"/>
//!   <Bdy SrvLvl="-149" Phn="+16501234567"/>
//! </Msg>
//! ```
//!
//! `Hdr` carries routing data and the command number; `Bdy` carries free-form
//! attributes whose meaning depends on the command. Answering an offered call
//! means replying with command [`CMD_ANSWER`] from the callee's side; a later
//! [`CMD_TAKEOVER`] tells the endpoint another party owns the call.
//!
//! ## Examples
//!
//! ```rust
//! use wsphone_client_core::control::{ControlMessage, CMD_ANSWER};
//!
//! let offer = ControlMessage::from_xml(
//!     r#"<Msg><Hdr SID="1" Req="r" From="a" To="b" Cmd="6"/><Bdy Phn="123"/></Msg>"#,
//! ).unwrap();
//!
//! let reply = offer.reply(CMD_ANSWER, [("Cln", "802398808016")]);
//! assert_eq!(
//!     reply.to_xml().unwrap(),
//!     r#"<Msg><Hdr SID="1" Req="r" From="b" To="a" Cmd="17"/><Bdy Cln="802398808016"/></Msg>"#,
//! );
//! ```

use std::io::Cursor;

use quick_xml::events::{BytesEnd, BytesStart, Event};
use quick_xml::{Reader, Writer};
use thiserror::Error;

/// Command announcing that another party took the call over
pub const CMD_TAKEOVER: u32 = 7;

/// Command accepting an offered call
pub const CMD_ANSWER: u32 = 17;

/// Header carrying the control message of an INVITE
pub const CONTROL_HEADER: &str = "P-rc";

/// `Content-Type` of control messages sent as `MESSAGE` bodies
pub const CONTROL_CONTENT_TYPE: &str = "x-rc/agent";

/// Text that identifies a takeover command inside a `MESSAGE` body
pub const TAKEOVER_MARKER: &str = " Cmd=\"7\"";

/// Result type for control message encoding and decoding
pub type ControlResult<T> = Result<T, ControlError>;

/// Errors raised by the control message codec
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ControlError {
    /// The document is not well-formed XML
    #[error("Malformed control XML: {0}")]
    Xml(String),

    /// A required element is absent
    #[error("Control message has no <{0}> element")]
    MissingElement(&'static str),

    /// A required `Hdr` attribute is absent
    #[error("Control header has no {0} attribute")]
    MissingAttribute(&'static str),

    /// `Cmd` is not a number
    #[error("Invalid control command: {0}")]
    InvalidCommand(String),
}

/// Routing block of a control message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlHeader {
    pub sid: String,
    pub req: String,
    pub from: String,
    pub to: String,
    pub cmd: u32,
}

/// A decoded `<Msg>` document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlMessage {
    pub header: ControlHeader,
    /// `Bdy` attributes in document order
    pub body: Vec<(String, String)>,
}

impl ControlMessage {
    /// Decodes a control document
    ///
    /// An XML prolog and whitespace between elements are tolerated, and
    /// attribute values are unescaped. `Bdy` is optional.
    pub fn from_xml(xml: &str) -> ControlResult<Self> {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(true);

        let mut header_attrs: Option<Vec<(String, String)>> = None;
        let mut body = Vec::new();

        loop {
            match reader.read_event() {
                Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e)) => match e.name().as_ref() {
                    b"Hdr" => header_attrs = Some(read_attributes(e)?),
                    b"Bdy" => body = read_attributes(e)?,
                    _ => {}
                },
                Ok(Event::Eof) => break,
                Err(e) => return Err(xml_error(e)),
                _ => {}
            }
        }

        let attrs = header_attrs.ok_or(ControlError::MissingElement("Hdr"))?;
        let lookup = |name: &'static str| -> ControlResult<String> {
            attrs
                .iter()
                .find(|(key, _)| key == name)
                .map(|(_, value)| value.clone())
                .ok_or(ControlError::MissingAttribute(name))
        };

        let cmd = lookup("Cmd")?;
        let header = ControlHeader {
            sid: lookup("SID")?,
            req: lookup("Req")?,
            from: lookup("From")?,
            to: lookup("To")?,
            cmd: cmd
                .trim()
                .parse()
                .map_err(|_| ControlError::InvalidCommand(cmd.clone()))?,
        };

        Ok(ControlMessage { header, body })
    }

    /// Encodes the document on a single line, attributes in fixed order
    pub fn to_xml(&self) -> ControlResult<String> {
        let mut writer = Writer::new(Cursor::new(Vec::new()));
        writer
            .write_event(Event::Start(BytesStart::new("Msg")))
            .map_err(xml_error)?;

        let mut hdr = BytesStart::new("Hdr");
        let cmd = self.header.cmd.to_string();
        hdr.push_attribute(("SID", self.header.sid.as_str()));
        hdr.push_attribute(("Req", self.header.req.as_str()));
        hdr.push_attribute(("From", self.header.from.as_str()));
        hdr.push_attribute(("To", self.header.to.as_str()));
        hdr.push_attribute(("Cmd", cmd.as_str()));
        writer.write_event(Event::Empty(hdr)).map_err(xml_error)?;

        let mut bdy = BytesStart::new("Bdy");
        for (key, value) in &self.body {
            bdy.push_attribute((key.as_str(), value.as_str()));
        }
        writer.write_event(Event::Empty(bdy)).map_err(xml_error)?;

        writer
            .write_event(Event::End(BytesEnd::new("Msg")))
            .map_err(xml_error)?;

        String::from_utf8(writer.into_inner().into_inner()).map_err(xml_error)
    }

    /// Builds the reply to this message
    ///
    /// `SID` and `Req` are kept, `From` and `To` are swapped.
    pub fn reply<I, K, V>(&self, cmd: u32, body: I) -> ControlMessage
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        ControlMessage {
            header: ControlHeader {
                sid: self.header.sid.clone(),
                req: self.header.req.clone(),
                from: self.header.to.clone(),
                to: self.header.from.clone(),
                cmd,
            },
            body: body
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        }
    }

    /// Looks up a `Bdy` attribute
    pub fn body_value(&self, key: &str) -> Option<&str> {
        self.body
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Returns true when a `MESSAGE` body carries a takeover command
pub fn is_takeover(body: &str) -> bool {
    body.contains(TAKEOVER_MARKER)
}

fn xml_error<E: std::fmt::Display>(e: E) -> ControlError {
    ControlError::Xml(e.to_string())
}

fn read_attributes(element: &BytesStart<'_>) -> ControlResult<Vec<(String, String)>> {
    let mut attrs = Vec::new();
    for attr in element.attributes() {
        let attr = attr.map_err(xml_error)?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr
            .unescape_value()
            .map_err(xml_error)?
            .into_owned();
        attrs.push((key, value));
    }
    Ok(attrs)
}
