//! Minimal XML-RPC codec for string-returning methods.
//!
//! Only what the placement report method needs: a call with a single struct
//! parameter of string members, and a response carrying a single string
//! value or a fault.

use quick_xml::escape::escape;
use quick_xml::events::Event;
use quick_xml::Reader;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::Url;

use crate::error::{RpcError, RpcResult, TransportError};
use crate::transport::{HttpRequest, Transport};

/// Render a `methodCall` with one struct parameter.
///
/// Members are written in the order given.
pub fn encode_call(method: &str, members: &[(&str, String)]) -> String {
    let mut xml = String::from("<?xml version=\"1.0\"?><methodCall><methodName>");
    xml.push_str(&escape(method));
    xml.push_str("</methodName><params><param><value><struct>");
    for (name, value) in members {
        xml.push_str("<member><name>");
        xml.push_str(&escape(*name));
        xml.push_str("</name><value><string>");
        xml.push_str(&escape(value.as_str()));
        xml.push_str("</string></value></member>");
    }
    xml.push_str("</struct></value></param></params></methodCall>");
    xml
}

const PARAM_PATH: [&[u8]; 3] = [b"methodResponse", b"params", b"param"];

fn at_param(stack: &[Vec<u8>]) -> bool {
    stack.len() == PARAM_PATH.len()
        && stack.iter().zip(PARAM_PATH).all(|(a, b)| a.as_slice() == b)
}

fn in_param_value(stack: &[Vec<u8>]) -> bool {
    stack.len() == 4 && at_param(&stack[..3]) && stack[3] == b"value"
}

fn in_param_string(stack: &[Vec<u8>]) -> bool {
    stack.len() == 5 && in_param_value(&stack[..4]) && stack[4] == b"string"
}

#[derive(Default)]
struct FaultMember {
    name: String,
    value: String,
}

#[derive(Default)]
struct ParamState {
    seen: bool,
    done: bool,
    typed: Option<String>,
    untyped: String,
}

impl ParamState {
    /// Track an element opening (or an empty element) at the current depth.
    fn open(&mut self, stack: &[Vec<u8>], name: &[u8]) -> RpcResult<()> {
        if self.done {
            return Ok(());
        }
        if in_param_value(stack) {
            if name != b"string" {
                return Err(RpcError::Malformed(format!(
                    "expected a string value, found <{}>",
                    String::from_utf8_lossy(name)
                )));
            }
            self.typed = Some(String::new());
        } else if at_param(stack) && name == b"value" {
            self.seen = true;
        }
        Ok(())
    }
}

/// Decode a `methodResponse` holding one string value.
///
/// Untyped values are strings per XML-RPC. Any other value type, a missing
/// parameter or unparseable XML is [`RpcError::Malformed`]; a `fault`
/// response is [`RpcError::Fault`].
pub fn decode_response(body: &str) -> RpcResult<String> {
    let mut reader = Reader::from_str(body);

    let mut stack: Vec<Vec<u8>> = Vec::new();
    let mut param = ParamState::default();

    let mut fault = false;
    let mut member = FaultMember::default();
    let mut fault_code: Option<i64> = None;
    let mut fault_string = String::new();

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                let name = e.local_name().as_ref().to_vec();
                match name.as_slice() {
                    b"fault" => fault = true,
                    b"member" => member = FaultMember::default(),
                    _ => {}
                }
                param.open(&stack, &name)?;
                stack.push(name);
            }
            Event::Empty(e) => {
                param.open(&stack, e.local_name().as_ref())?;
            }
            Event::End(_) => {
                let name = stack.pop().unwrap_or_default();
                match name.as_slice() {
                    b"param" if param.seen => param.done = true,
                    b"member" if fault => {
                        let value = member.value.trim();
                        match member.name.trim() {
                            "faultCode" => fault_code = value.parse().ok(),
                            "faultString" => fault_string = value.to_string(),
                            _ => {}
                        }
                    }
                    _ => {}
                }
            }
            Event::Text(t) => {
                let text = t.unescape()?;
                collect_text(&text, &stack, fault, &mut member, &mut param);
            }
            Event::CData(c) => {
                let raw = c.into_inner();
                let text = String::from_utf8_lossy(&raw);
                collect_text(&text, &stack, fault, &mut member, &mut param);
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if fault {
        return Err(RpcError::Fault {
            code: fault_code.unwrap_or_default(),
            message: fault_string,
        });
    }
    if !param.seen {
        return Err(RpcError::Malformed("response has no parameter value".to_string()));
    }
    Ok(param.typed.unwrap_or(param.untyped))
}

fn collect_text(
    text: &str,
    stack: &[Vec<u8>],
    fault: bool,
    member: &mut FaultMember,
    param: &mut ParamState,
) {
    if fault {
        match stack.last().map(Vec::as_slice) {
            Some(b"name") => member.name.push_str(text),
            _ if stack.iter().any(|n| n == b"member") => member.value.push_str(text),
            _ => {}
        }
        return;
    }
    if param.done {
        return;
    }
    if in_param_string(stack) {
        if let Some(value) = param.typed.as_mut() {
            value.push_str(text);
        }
    } else if in_param_value(stack) {
        param.untyped.push_str(text);
    }
}

/// Call `method` with one struct parameter and return its string result.
///
/// A non-success HTTP status is reported as a transport error.
pub async fn call<T: Transport>(
    transport: &T,
    url: &Url,
    method: &str,
    members: &[(&str, String)],
) -> RpcResult<String> {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("text/xml"));

    let request = HttpRequest {
        url: url.clone(),
        headers,
        body: encode_call(method, members),
    };
    let response = transport.round_trip(request).await?;

    if !response.status.is_success() {
        let body: String = String::from_utf8_lossy(&response.body).chars().take(200).collect();
        return Err(TransportError::Status {
            status: response.status.as_u16(),
            body,
        }
        .into());
    }

    let body = String::from_utf8(response.body).map_err(TransportError::from)?;
    decode_response(&body)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(value: &str) -> String {
        format!(
            "<?xml version=\"1.0\"?>\n<methodResponse>\n  <params>\n    <param>\n      {}\n    </param>\n  </params>\n</methodResponse>\n",
            value
        )
    }

    #[test]
    fn test_encode_call() {
        let xml = encode_call(
            "getPlacementReport",
            &[("username", "jdoe".to_string()), ("page_num", "1".to_string())],
        );
        assert_eq!(
            xml,
            "<?xml version=\"1.0\"?><methodCall><methodName>getPlacementReport</methodName>\
             <params><param><value><struct>\
             <member><name>username</name><value><string>jdoe</string></value></member>\
             <member><name>page_num</name><value><string>1</string></value></member>\
             </struct></value></param></params></methodCall>"
        );
    }

    #[test]
    fn test_encode_call_escapes_values() {
        let xml = encode_call("m", &[("password", "a<b&c".to_string())]);
        assert!(xml.contains("<string>a&lt;b&amp;c</string>"));
    }

    #[test]
    fn test_decode_string_value() {
        let body = response("<value><string>\"Name\",\"Email\"\n\"Doe, John\",\"j@x.edu\"</string></value>");
        assert_eq!(
            decode_response(&body).unwrap(),
            "\"Name\",\"Email\"\n\"Doe, John\",\"j@x.edu\""
        );
    }

    #[test]
    fn test_decode_untyped_value() {
        let body = response("<value>No records found</value>");
        assert_eq!(decode_response(&body).unwrap(), "No records found");
    }

    #[test]
    fn test_decode_ignores_whitespace_around_string() {
        let body = response("<value>\n  <string>abc</string>\n</value>");
        assert_eq!(decode_response(&body).unwrap(), "abc");
    }

    #[test]
    fn test_decode_empty_string() {
        assert_eq!(decode_response(&response("<value><string/></value>")).unwrap(), "");
        assert_eq!(decode_response(&response("<value></value>")).unwrap(), "");
    }

    #[test]
    fn test_decode_cdata_value() {
        let body = response("<value><string><![CDATA[a < b]]></string></value>");
        assert_eq!(decode_response(&body).unwrap(), "a < b");
    }

    #[test]
    fn test_decode_unescapes_entities() {
        let body = response("<value><string>Smith &amp; Sons</string></value>");
        assert_eq!(decode_response(&body).unwrap(), "Smith & Sons");
    }

    #[test]
    fn test_decode_fault() {
        let body = "<?xml version=\"1.0\"?><methodResponse><fault><value><struct>\
            <member><name>faultCode</name><value><int>4</int></value></member>\
            <member><name>faultString</name><value><string>Too many parameters.</string></value></member>\
            </struct></value></fault></methodResponse>";
        match decode_response(body) {
            Err(RpcError::Fault { code, message }) => {
                assert_eq!(code, 4);
                assert_eq!(message, "Too many parameters.");
            }
            other => panic!("expected fault, got {:?}", other),
        }
    }

    #[test]
    fn test_decode_non_string_is_malformed() {
        let body = response("<value><int>7</int></value>");
        assert!(matches!(decode_response(&body), Err(RpcError::Malformed(_))));
    }

    #[test]
    fn test_decode_missing_param_is_malformed() {
        let body = "<?xml version=\"1.0\"?><methodResponse><params></params></methodResponse>";
        assert!(matches!(decode_response(body), Err(RpcError::Malformed(_))));
    }

    #[test]
    fn test_decode_broken_xml_is_malformed() {
        let body = "<methodResponse><params><param><value><string>x</value></param>";
        assert!(matches!(decode_response(body), Err(RpcError::Malformed(_))));
    }
}
