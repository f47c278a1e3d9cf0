//! Property names and multistatus XML serialization (RFC 4918).

/// DAV namespace.
pub const DAV_NS: &str = "DAV:";
/// ownCloud namespace.
pub const OC_NS: &str = "http://owncloud.org/ns";

/// Property name in Clark notation, e.g. `{DAV:}displayname`.
pub fn clark(namespace: &str, local: &str) -> String {
    format!("{{{namespace}}}{local}")
}

/// Split a Clark name into namespace and local name.
pub fn split_clark(name: &str) -> (&str, &str) {
    name.strip_prefix('{')
        .and_then(|rest| rest.split_once('}'))
        .unwrap_or(("", name))
}

/// Depth header values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Depth {
    /// Only the resource itself.
    Zero,
    /// Resource and its immediate children.
    One,
}

impl Depth {
    /// Parse from a header value. `infinity` is served as one level.
    pub fn from_header(value: Option<&str>) -> Self {
        match value {
            Some("0") => Self::Zero,
            _ => Self::One,
        }
    }
}

/// Value of a property in a response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropValue {
    /// Text, escaped on output.
    Text(String),
    /// Pre-rendered XML, written as is.
    Xml(String),
}

/// One `<d:response>` entry.
#[derive(Debug, Clone, Default)]
pub struct DavResponse {
    /// Encoded href of the resource.
    pub href: String,
    /// Properties answered with 200.
    pub found: Vec<(String, PropValue)>,
    /// Properties answered with 404.
    pub not_found: Vec<String>,
    /// Properties answered with 403.
    pub forbidden: Vec<String>,
    /// Properties not applied because another one failed.
    pub failed_dependency: Vec<String>,
}

impl DavResponse {
    /// An empty response for `href`.
    pub fn new(href: impl Into<String>) -> Self {
        Self {
            href: href.into(),
            ..Self::default()
        }
    }
}

/// Generate a multistatus XML document.
pub fn build_multistatus_xml(responses: &[DavResponse]) -> String {
    let mut xml = String::from("<?xml version=\"1.0\" encoding=\"utf-8\"?>\n");
    xml.push_str("<d:multistatus xmlns:d=\"DAV:\" xmlns:oc=\"http://owncloud.org/ns\">\n");

    for response in responses {
        xml.push_str(" <d:response>\n");
        xml.push_str(&format!("  <d:href>{}</d:href>\n", xml_escape(&response.href)));

        if !response.found.is_empty() {
            xml.push_str("  <d:propstat>\n   <d:prop>\n");
            for (name, value) in &response.found {
                let inner = match value {
                    PropValue::Text(text) => xml_escape(text),
                    PropValue::Xml(raw) => raw.clone(),
                };
                xml.push_str("    ");
                xml.push_str(&element(name, Some(&inner)));
                xml.push('\n');
            }
            xml.push_str("   </d:prop>\n   <d:status>HTTP/1.1 200 OK</d:status>\n  </d:propstat>\n");
        }

        for (names, status) in [
            (&response.forbidden, "403 Forbidden"),
            (&response.not_found, "404 Not Found"),
            (&response.failed_dependency, "424 Failed Dependency"),
        ] {
            if names.is_empty() {
                continue;
            }
            xml.push_str("  <d:propstat>\n   <d:prop>\n");
            for name in names {
                xml.push_str("    ");
                xml.push_str(&element(name, None));
                xml.push('\n');
            }
            xml.push_str(&format!(
                "   </d:prop>\n   <d:status>HTTP/1.1 {status}</d:status>\n  </d:propstat>\n"
            ));
        }

        xml.push_str(" </d:response>\n");
    }

    xml.push_str("</d:multistatus>\n");
    xml
}

/// Build an error XML body.
pub fn build_error_xml(message: &str) -> String {
    let mut xml = String::from("<?xml version=\"1.0\" encoding=\"utf-8\"?>\n");
    xml.push_str("<d:error xmlns:d=\"DAV:\" xmlns:s=\"http://sabredav.org/ns\">\n");
    xml.push_str(&format!("  <s:message>{}</s:message>\n", xml_escape(message)));
    xml.push_str("</d:error>\n");
    xml
}

/// Render one property element. Known namespaces use their prefix, others
/// declare a default namespace on the element.
fn element(name: &str, inner: Option<&str>) -> String {
    let (namespace, local) = split_clark(name);
    let (open, close) = match namespace {
        DAV_NS => (format!("d:{local}"), format!("d:{local}")),
        OC_NS => (format!("oc:{local}"), format!("oc:{local}")),
        "" => (local.to_string(), local.to_string()),
        other => (
            format!("{local} xmlns=\"{}\"", xml_escape(other)),
            local.to_string(),
        ),
    };
    match inner {
        Some(inner) if !inner.is_empty() => format!("<{open}>{inner}</{close}>"),
        _ => format!("<{open}/>"),
    }
}

/// Escape XML special characters.
pub fn xml_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
