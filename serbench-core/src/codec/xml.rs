// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! XML codec.
//!
//! Values map onto typed elements so decoding recovers the exact tree:
//!
//! ```text
//! <sample>
//!   <map>
//!     <entry><key>structId</key><int>1</int></entry>
//!     <entry><key>arrayFloat</key><seq><float>0.5</float></seq></entry>
//!   </map>
//! </sample>
//! ```

use async_trait::async_trait;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use serde_json::{Map, Number, Value};

use super::{CodecAdapter, CodecContext};
use crate::error::{CodecError, CodecResult};
use crate::samples::Sample;
use crate::storage::ScratchStore;
use crate::types::FormatId;

const ROOT: &str = "sample";

pub struct XmlCodec {
    format: FormatId,
    scratch: ScratchStore,
}

impl XmlCodec {
    pub fn new(ctx: CodecContext) -> Self {
        Self {
            scratch: ctx.scratch(),
            format: ctx.format,
        }
    }
}

#[async_trait]
impl CodecAdapter for XmlCodec {
    fn format(&self) -> &FormatId {
        &self.format
    }

    async fn initialize(&mut self) -> CodecResult<()> {
        Ok(())
    }

    fn encode(&self, sample: &Sample) -> CodecResult<Vec<u8>> {
        to_xml(&sample.value).map_err(|reason| CodecError::Encode {
            sample_index: sample.index,
            reason,
        })
    }

    fn decode(&self, sample_index: usize, bytes: &[u8]) -> CodecResult<Value> {
        from_xml(bytes).map_err(|reason| CodecError::Decode {
            sample_index,
            reason,
        })
    }

    fn scratch(&self) -> &ScratchStore {
        &self.scratch
    }
}

/// Serialize a value tree as an XML document.
pub fn to_xml(value: &Value) -> Result<Vec<u8>, String> {
    let mut writer = XmlWriter {
        inner: Writer::new(Vec::new()),
    };
    writer.open(ROOT)?;
    writer.value(value)?;
    writer.close(ROOT)?;
    Ok(writer.inner.into_inner())
}

/// Parse a document produced by [`to_xml`].
pub fn from_xml(bytes: &[u8]) -> Result<Value, String> {
    let mut parser = XmlParser {
        reader: Reader::from_reader(bytes),
    };

    match parser.next_element()? {
        Token::Open(name) if name == ROOT => {}
        other => return Err(format!("expected <{}> root, found {:?}", ROOT, other)),
    }
    let value = parser.value()?;
    parser.expect_close()?;

    match parser.next_element()? {
        Token::Eof => Ok(value),
        other => Err(format!("trailing content after root: {:?}", other)),
    }
}

struct XmlWriter {
    inner: Writer<Vec<u8>>,
}

impl XmlWriter {
    fn open(&mut self, name: &str) -> Result<(), String> {
        self.inner
            .write_event(Event::Start(BytesStart::new(name)))
            .map_err(|e| e.to_string())
    }

    fn close(&mut self, name: &str) -> Result<(), String> {
        self.inner
            .write_event(Event::End(BytesEnd::new(name)))
            .map_err(|e| e.to_string())
    }

    fn text_element(&mut self, name: &str, text: &str) -> Result<(), String> {
        self.open(name)?;
        self.inner
            .write_event(Event::Text(BytesText::new(text)))
            .map_err(|e| e.to_string())?;
        self.close(name)
    }

    fn value(&mut self, value: &Value) -> Result<(), String> {
        match value {
            Value::Null => {
                self.open("null")?;
                self.close("null")
            }
            Value::Bool(b) => self.text_element("bool", if *b { "true" } else { "false" }),
            Value::Number(n) if n.is_f64() => self.text_element("float", &n.to_string()),
            Value::Number(n) => self.text_element("int", &n.to_string()),
            Value::String(s) => self.text_element("str", s),
            Value::Array(items) => {
                self.open("seq")?;
                for item in items {
                    self.value(item)?;
                }
                self.close("seq")
            }
            Value::Object(fields) => {
                self.open("map")?;
                for (key, field) in fields {
                    self.open("entry")?;
                    self.text_element("key", key)?;
                    self.value(field)?;
                    self.close("entry")?;
                }
                self.close("map")
            }
        }
    }
}

#[derive(Debug)]
enum Token {
    Open(String),
    Empty(String),
    Close,
    Text(String),
    Eof,
}

struct XmlParser<'a> {
    reader: Reader<&'a [u8]>,
}

impl<'a> XmlParser<'a> {
    fn next_token(&mut self) -> Result<Token, String> {
        loop {
            let event = self.reader.read_event().map_err(|e| e.to_string())?;

            return match event {
                Event::Start(e) => Ok(Token::Open(element_name(e.name().as_ref())?)),
                Event::Empty(e) => Ok(Token::Empty(element_name(e.name().as_ref())?)),
                Event::End(_) => Ok(Token::Close),
                Event::Text(t) => Ok(Token::Text(
                    t.unescape().map_err(|e| e.to_string())?.into_owned(),
                )),
                Event::CData(c) => Ok(Token::Text(
                    String::from_utf8(c.into_inner().into_owned()).map_err(|e| e.to_string())?,
                )),
                Event::Eof => Ok(Token::Eof),
                // declarations, comments, processing instructions
                _ => continue,
            };
        }
    }

    /// Next token that is not whitespace between elements.
    fn next_element(&mut self) -> Result<Token, String> {
        loop {
            match self.next_token()? {
                Token::Text(text) if text.trim().is_empty() => continue,
                token => return Ok(token),
            }
        }
    }

    fn expect_close(&mut self) -> Result<(), String> {
        match self.next_element()? {
            Token::Close => Ok(()),
            other => Err(format!("expected closing tag, found {:?}", other)),
        }
    }

    /// Concatenated text up to the closing tag of the current element.
    fn text(&mut self) -> Result<String, String> {
        let mut text = String::new();
        loop {
            match self.next_token()? {
                Token::Text(chunk) => text.push_str(&chunk),
                Token::Close => return Ok(text),
                other => return Err(format!("expected text, found {:?}", other)),
            }
        }
    }

    fn value(&mut self) -> Result<Value, String> {
        match self.next_element()? {
            Token::Open(name) => self.element(&name, false),
            Token::Empty(name) => self.element(&name, true),
            other => Err(format!("expected value element, found {:?}", other)),
        }
    }

    fn element(&mut self, name: &str, empty: bool) -> Result<Value, String> {
        let text = |parser: &mut Self| {
            if empty {
                Ok(String::new())
            } else {
                parser.text()
            }
        };

        match name {
            "null" => {
                if !empty {
                    self.expect_close()?;
                }
                Ok(Value::Null)
            }
            "bool" => match text(self)?.as_str() {
                "true" => Ok(Value::Bool(true)),
                "false" => Ok(Value::Bool(false)),
                other => Err(format!("invalid bool {:?}", other)),
            },
            "int" => parse_int(&text(self)?),
            "float" => {
                let raw = text(self)?;
                raw.parse::<f64>()
                    .ok()
                    .and_then(Number::from_f64)
                    .map(Value::Number)
                    .ok_or_else(|| format!("invalid float {:?}", raw))
            }
            "str" => Ok(Value::String(text(self)?)),
            "seq" => {
                let mut items = Vec::new();
                if !empty {
                    loop {
                        match self.next_element()? {
                            Token::Open(child) => items.push(self.element(&child, false)?),
                            Token::Empty(child) => items.push(self.element(&child, true)?),
                            Token::Close => break,
                            other => return Err(format!("unexpected {:?} in <seq>", other)),
                        }
                    }
                }
                Ok(Value::Array(items))
            }
            "map" => {
                let mut fields = Map::new();
                if !empty {
                    loop {
                        match self.next_element()? {
                            Token::Open(child) if child == "entry" => {
                                let (key, value) = self.entry()?;
                                fields.insert(key, value);
                            }
                            Token::Close => break,
                            other => return Err(format!("unexpected {:?} in <map>", other)),
                        }
                    }
                }
                Ok(Value::Object(fields))
            }
            other => Err(format!("unknown element <{}>", other)),
        }
    }

    fn entry(&mut self) -> Result<(String, Value), String> {
        let key = match self.next_element()? {
            Token::Open(name) if name == "key" => self.text()?,
            Token::Empty(name) if name == "key" => String::new(),
            other => return Err(format!("expected <key>, found {:?}", other)),
        };
        let value = self.value()?;
        self.expect_close()?;
        Ok((key, value))
    }
}

fn element_name(raw: &[u8]) -> Result<String, String> {
    String::from_utf8(raw.to_vec()).map_err(|e| e.to_string())
}

fn parse_int(raw: &str) -> Result<Value, String> {
    if let Ok(n) = raw.parse::<i64>() {
        return Ok(Value::from(n));
    }
    raw.parse::<u64>()
        .map(Value::from)
        .map_err(|_| format!("invalid int {:?}", raw))
}
