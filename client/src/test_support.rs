//! In-memory transport and fixtures shared by the retrieval tests.

use reqwest::StatusCode;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::error::{TransportError, TransportResult};
use crate::report::END_MARKER;
use crate::transport::{HttpRequest, HttpResponse, Transport};

pub const HEADER: &str = r#""Name","Student Id","Email","Last login","Placement Assessment Number","Total Number of Placements Taken","Start Date","Start Time","End Date","End Time","Proctored Assessment","Time in Placement (in hours)","Placement Results %""#;

pub const DOE: &str = r#""Doe, John","912345678","JQD5678@EXAMPLE.EDU","03/06/2016","1","1","03/06/2016","01:42 PM","03/06/2016","03:23 PM","No/Complete","1.7","62%""#;

pub const ROE: &str = r#""Roe, Jane","912345679","JXR1234@EXAMPLE.EDU","03/07/2016","2","2","03/07/2016","09:05 AM","03/07/2016","10:15 AM","Yes/Complete","1.2","88%""#;

#[derive(Debug, Clone)]
enum Scripted {
    Page(String),
    Failure,
    Fault(i64, String),
}

/// Answers placement report calls from a per-class-code script.
///
/// Page `n` of a class code gets the `n`th scripted answer; pages past the
/// end of the script get the end marker. Page contents are wrapped in CDATA
/// the way the real service does. Every call is recorded as
/// `(class_code, page_num)`.
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    scripts: HashMap<String, Vec<Scripted>>,
    calls: Arc<Mutex<Vec<(String, u32)>>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, class_code: &str, content: String) -> Self {
        self.push(class_code, Scripted::Page(content));
        self
    }

    pub fn failure(mut self, class_code: &str) -> Self {
        self.push(class_code, Scripted::Failure);
        self
    }

    pub fn fault(mut self, class_code: &str, code: i64, message: &str) -> Self {
        self.push(class_code, Scripted::Fault(code, message.to_string()));
        self
    }

    /// Handle on the recorded calls, usable after the transport is moved.
    pub fn calls(&self) -> Arc<Mutex<Vec<(String, u32)>>> {
        Arc::clone(&self.calls)
    }

    fn push(&mut self, class_code: &str, entry: Scripted) {
        self.scripts.entry(class_code.to_string()).or_default().push(entry);
    }
}

/// Value of a string member in an encoded call.
pub fn member_value(body: &str, name: &str) -> Option<String> {
    let marker = format!("<name>{}</name><value><string>", name);
    let start = body.find(&marker)? + marker.len();
    let end = body[start..].find("</string>")?;
    Some(body[start..start + end].to_string())
}

fn string_response(value: &str) -> String {
    format!(
        "<?xml version=\"1.0\"?><methodResponse><params><param><value><string><![CDATA[{}]]></string></value></param></params></methodResponse>",
        value
    )
}

fn fault_response(code: i64, message: &str) -> String {
    format!(
        "<?xml version=\"1.0\"?><methodResponse><fault><value><struct>\
         <member><name>faultCode</name><value><int>{}</int></value></member>\
         <member><name>faultString</name><value><string>{}</string></value></member>\
         </struct></value></fault></methodResponse>",
        code, message
    )
}

impl Transport for ScriptedTransport {
    async fn round_trip(&self, request: HttpRequest) -> TransportResult<HttpResponse> {
        let class_code = member_value(&request.body, "class_code").unwrap_or_default();
        let page: u32 = member_value(&request.body, "page_num")
            .and_then(|p| p.parse().ok())
            .unwrap_or_default();
        self.calls.lock().unwrap().push((class_code.clone(), page));

        let entry = self
            .scripts
            .get(&class_code)
            .and_then(|s| s.get(page.saturating_sub(1) as usize))
            .cloned();

        let body = match entry {
            Some(Scripted::Page(content)) => string_response(&content),
            Some(Scripted::Failure) => {
                return Err(TransportError::Request("connection reset by peer".to_string()))
            }
            Some(Scripted::Fault(code, message)) => fault_response(code, &message),
            None => string_response(END_MARKER),
        };

        Ok(HttpResponse {
            status: StatusCode::OK,
            body: body.into_bytes(),
        })
    }
}
