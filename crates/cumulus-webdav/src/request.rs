//! Parsing of PROPFIND and PROPPATCH request bodies.

use quick_xml::NsReader;
use quick_xml::events::Event;
use quick_xml::name::{Namespace, ResolveResult};

use cumulus_core::error::AppError;
use cumulus_core::result::AppResult;
use cumulus_entity::property::PropertyChange;

const PROPFIND: &str = "{DAV:}propfind";
const PROPERTYUPDATE: &str = "{DAV:}propertyupdate";
const PROP: &str = "{DAV:}prop";
const SET: &str = "{DAV:}set";
const REMOVE: &str = "{DAV:}remove";

/// What a PROPFIND asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropfindRequest {
    /// Every property.
    AllProp,
    /// Property names only.
    PropName,
    /// The named properties, in Clark notation.
    Prop(Vec<String>),
}

fn xml_error(e: quick_xml::Error) -> AppError {
    AppError::validation(format!("Invalid XML body: {e}"))
}

fn clark_name(namespace: &ResolveResult<'_>, local: &[u8]) -> String {
    let local = String::from_utf8_lossy(local);
    match namespace {
        ResolveResult::Bound(Namespace(ns)) => {
            format!("{{{}}}{}", String::from_utf8_lossy(ns), local)
        }
        _ => local.into_owned(),
    }
}

/// Parse a PROPFIND body. An empty body means `allprop`.
pub fn parse_propfind(body: &str) -> AppResult<PropfindRequest> {
    if body.trim().is_empty() {
        return Ok(PropfindRequest::AllProp);
    }

    let mut reader = NsReader::from_str(body);
    reader.trim_text(true);

    let mut stack: Vec<String> = Vec::new();
    let mut props = Vec::new();
    let mut request = None;

    loop {
        let (namespace, event) = reader.read_resolved_event().map_err(xml_error)?;
        let (name, is_empty) = match &event {
            Event::Start(e) => (clark_name(&namespace, e.local_name().as_ref()), false),
            Event::Empty(e) => (clark_name(&namespace, e.local_name().as_ref()), true),
            Event::End(_) => {
                stack.pop();
                continue;
            }
            Event::Eof => break,
            _ => continue,
        };


        match stack.len() {
            0 if name != PROPFIND => {
                return Err(AppError::validation("Expected a {DAV:}propfind document"));
            }
            1 => match name.as_str() {
                "{DAV:}allprop" => request = Some(PropfindRequest::AllProp),
                "{DAV:}propname" => request = Some(PropfindRequest::PropName),
                _ => {}
            },
            2 if stack[1] == PROP => props.push(name.clone()),
            _ => {}
        }
        if !is_empty {
            stack.push(name);
        }
    }

    if !stack.is_empty() {
        return Err(AppError::validation("Unexpected end of XML body"));
    }
    Ok(request.unwrap_or(PropfindRequest::Prop(props)))
}

struct Capture {
    name: String,
    set: bool,
    depth: usize,
    text: String,
}

/// Parse a PROPPATCH body into changes, in document order. Properties
/// under `<d:remove>` become removals.
pub fn parse_proppatch(body: &str) -> AppResult<Vec<PropertyChange>> {
    let mut reader = NsReader::from_str(body);
    reader.trim_text(true);

    let mut stack: Vec<String> = Vec::new();
    let mut changes = Vec::new();
    let mut capture: Option<Capture> = None;
    let mut seen_root = false;

    loop {
        let (namespace, event) = reader.read_resolved_event().map_err(xml_error)?;
        match event {
            Event::Start(e) => {
                let name = clark_name(&namespace, e.local_name().as_ref());
                if stack.is_empty() {
                    if name != PROPERTYUPDATE {
                        return Err(AppError::validation(
                            "Expected a {DAV:}propertyupdate document",
                        ));
                    }
                    seen_root = true;
                }
                if capture.is_none() && in_prop(&stack) {
                    capture = Some(Capture {
                        name: name.clone(),
                        set: stack[1] == SET,
                        depth: stack.len(),
                        text: String::new(),
                    });
                }
                stack.push(name);
            }
            Event::Empty(e) => {
                let name = clark_name(&namespace, e.local_name().as_ref());
                if stack.is_empty() {
                    if name != PROPERTYUPDATE {
                        return Err(AppError::validation(
                            "Expected a {DAV:}propertyupdate document",
                        ));
                    }
                    seen_root = true;
                }
                if capture.is_none() && in_prop(&stack) {
                    changes.push(if stack[1] == SET {
                        PropertyChange::set(name, "")
                    } else {
                        PropertyChange::remove(name)
                    });
                }
            }
            Event::Text(t) => {
                if let Some(capture) = capture.as_mut() {
                    capture.text.push_str(&t.unescape().map_err(xml_error)?);
                }
            }
            Event::CData(c) => {
                if let Some(capture) = capture.as_mut() {
                    capture.text.push_str(&String::from_utf8_lossy(&c.into_inner()));
                }
            }
            Event::End(_) => {
                stack.pop();
                if capture.as_ref().is_some_and(|c| c.depth == stack.len()) {
                    if let Some(done) = capture.take() {
                        changes.push(if done.set {
                            PropertyChange::set(done.name, done.text)
                        } else {
                            PropertyChange::remove(done.name)
                        });
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !seen_root {
        return Err(AppError::validation("Expected a {DAV:}propertyupdate document"));
    }
    if !stack.is_empty() {
        return Err(AppError::validation("Unexpected end of XML body"));
    }
    Ok(changes)
}

/// Whether the open elements are `propertyupdate > set|remove > prop`.
fn in_prop(stack: &[String]) -> bool {
    stack.len() == 3 && matches!(stack[1].as_str(), SET | REMOVE) && stack[2] == PROP
}
