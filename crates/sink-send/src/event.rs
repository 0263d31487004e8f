//! OpenNMS event model, the XML document the sender publishes by default.
//!
//! Element and attribute names follow the OpenNMS event schema. Empty
//! optional fields are left out of the document entirely, as eventd expects.

use chrono::{DateTime, FixedOffset, Local};
use serde::{Serialize, Serializer};

// ── Time ──────────────────────────────────────────────────────────────────────

/// Event timestamp, rendered as `2006-01-02T15:04:05.999999-07:00`
/// (fraction trimmed of trailing zeros, omitted when whole).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventTime(pub DateTime<FixedOffset>);

impl EventTime {
    pub fn now() -> Self {
        Self(Local::now().fixed_offset())
    }

    pub fn format(&self) -> String {
        let t = &self.0;
        let mut out = t.format("%Y-%m-%dT%H:%M:%S").to_string();
        let micros = t.timestamp_subsec_micros();
        if micros > 0 {
            let fraction = format!("{micros:06}");
            out.push('.');
            out.push_str(fraction.trim_end_matches('0'));
        }
        out.push_str(&t.format("%:z").to_string());
        out
    }
}

impl Serialize for EventTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.format())
    }
}

fn is_zero(v: &i32) -> bool {
    *v == 0
}

fn is_false(v: &bool) -> bool {
    !*v
}

// ── Elements ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize)]
pub struct MaskElement {
    pub mename: String,
    pub mevalue: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Mask {
    pub maskelement: Vec<MaskElement>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Snmp {
    pub id: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub idtext: String,
    pub version: String,
    pub specific: i32,
    pub generic: i32,
    pub community: String,
    #[serde(rename = "time-stamp")]
    pub timestamp: i64,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Parm {
    #[serde(rename = "parmName")]
    pub name: String,
    pub value: String,
}

impl Parm {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Parms {
    pub parm: Vec<Parm>,
}

/// `dest` is one of logndisplay, displayonly, logonly, suppress, donotpersist.
#[derive(Debug, Clone, Default, Serialize)]
pub struct LogMsg {
    #[serde(rename = "@dest")]
    pub dest: String,
    #[serde(rename = "@notify", skip_serializing_if = "is_false")]
    pub notify: bool,
    #[serde(rename = "$text")]
    pub content: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Correlation {
    #[serde(rename = "@state")]
    pub state: String,
    #[serde(rename = "@path")]
    pub path: String,
    pub cuei: Vec<String>,
    pub cmin: String,
    pub cmax: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ctime: Option<EventTime>,
}

/// Element with an on/off `state` attribute and text content.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Toggle {
    #[serde(rename = "@state")]
    pub state: String,
    #[serde(rename = "$text")]
    pub content: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct OperAction {
    #[serde(rename = "@state")]
    pub state: String,
    #[serde(rename = "@menutext")]
    pub menu_text: String,
    #[serde(rename = "$text")]
    pub content: String,
}

/// `mechanism` is one of snmpudp, snmptcp, xmltcp, xmludp.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Forward {
    #[serde(rename = "@state")]
    pub state: String,
    #[serde(rename = "@mechanism")]
    pub mechanism: String,
    #[serde(rename = "$text")]
    pub content: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Script {
    #[serde(rename = "@language")]
    pub language: String,
    #[serde(rename = "$text")]
    pub content: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct UpdateField {
    #[serde(rename = "@field-name")]
    pub field_name: String,
    #[serde(rename = "@update-on-reduction")]
    pub update_on_reduction: bool,
    #[serde(rename = "@value-expression")]
    pub value_expression: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ManagedObject {
    #[serde(rename = "@type")]
    pub kind: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct AlarmData {
    #[serde(rename = "@reduction-key")]
    pub reduction_key: String,
    #[serde(rename = "@alarm-type")]
    pub alarm_type: i32,
    #[serde(rename = "@clear-key", skip_serializing_if = "String::is_empty")]
    pub clear_key: String,
    #[serde(rename = "@auto-clean", skip_serializing_if = "is_false")]
    pub auto_clean: bool,
    #[serde(rename = "@x733-alarm-type", skip_serializing_if = "String::is_empty")]
    pub x733_alarm_type: String,
    #[serde(rename = "@x733-probable-cause", skip_serializing_if = "String::is_empty")]
    pub x733_probable_cause: String,
    #[serde(rename = "update-field", skip_serializing_if = "Vec::is_empty")]
    pub update_field: Vec<UpdateField>,
    #[serde(rename = "managed-object", skip_serializing_if = "Option::is_none")]
    pub managed_object: Option<ManagedObject>,
}

// ── Event ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename = "event", rename_all = "kebab-case")]
pub struct Event {
    #[serde(rename = "@uuid", skip_serializing_if = "String::is_empty")]
    pub uuid: String,
    #[serde(skip_serializing_if = "is_zero")]
    pub dbid: i32,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub dist_poller: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creation_time: Option<EventTime>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub master_station: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mask: Option<Mask>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub uei: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub source: String,
    #[serde(rename = "nodeid", skip_serializing_if = "is_zero")]
    pub node_id: i32,
    #[serde(rename = "time", skip_serializing_if = "Option::is_none")]
    pub time: Option<EventTime>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub host: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub interface: String,
    #[serde(rename = "snmphost", skip_serializing_if = "String::is_empty")]
    pub snmp_host: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub service: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snmp: Option<Snmp>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parms: Option<Parms>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub descr: String,
    #[serde(rename = "logmsg", skip_serializing_if = "Option::is_none")]
    pub log_msg: Option<LogMsg>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub severity: String,
    #[serde(rename = "pathoutage", skip_serializing_if = "String::is_empty")]
    pub path_outage: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correlation: Option<Correlation>,
    #[serde(rename = "operinstruct", skip_serializing_if = "String::is_empty")]
    pub oper_instruct: String,
    #[serde(rename = "autoaction", skip_serializing_if = "Vec::is_empty")]
    pub auto_action: Vec<Toggle>,
    #[serde(rename = "operaction", skip_serializing_if = "Vec::is_empty")]
    pub oper_action: Vec<OperAction>,
    #[serde(rename = "autoacknowledge", skip_serializing_if = "Option::is_none")]
    pub auto_acknowledge: Option<Toggle>,
    #[serde(rename = "loggroup", skip_serializing_if = "Vec::is_empty")]
    pub log_group: Vec<String>,
    #[serde(rename = "tticket", skip_serializing_if = "Option::is_none")]
    pub tticket: Option<Toggle>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub forward: Option<Forward>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub script: Option<Script>,
    #[serde(rename = "ifIndex", skip_serializing_if = "is_zero")]
    pub if_index: i32,
    #[serde(rename = "ifAlias", skip_serializing_if = "String::is_empty")]
    pub if_alias: String,
    #[serde(rename = "mouseovertext", skip_serializing_if = "String::is_empty")]
    pub mouse_over_text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alarm_data: Option<AlarmData>,
}

impl Event {
    /// The sample trap event the sender publishes when no payload file is given.
    pub fn sample(time: EventTime) -> Self {
        Self {
            uei: "uei.opennms.org/traps/sample".into(),
            time: Some(time),
            node_id: 10,
            interface: "127.0.0.1".into(),
            source: "External".into(),
            severity: "Warning".into(),
            mask: Some(Mask {
                maskelement: vec![
                    MaskElement {
                        mename: "id".into(),
                        mevalue: vec![".1.2.3.4.5.6.7".into()],
                    },
                    MaskElement {
                        mename: "generic".into(),
                        mevalue: vec!["6".into()],
                    },
                    MaskElement {
                        mename: "specific".into(),
                        mevalue: vec!["1".into()],
                    },
                ],
            }),
            log_msg: Some(LogMsg {
                dest: "donotpersist".into(),
                notify: false,
                content: "This is a test".into(),
            }),
            descr: "This is a test".into(),
            parms: Some(Parms {
                parm: vec![Parm::new("owner", "agalue")],
            }),
            alarm_data: Some(AlarmData {
                reduction_key: "uei.opennms.org/traps/sample::10".into(),
                alarm_type: 3,
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    /// Serialize as an indented XML document.
    pub fn to_xml(&self) -> Result<String, EventError> {
        let mut buffer = String::new();
        let mut serializer = quick_xml::se::Serializer::new(&mut buffer);
        serializer.indent(' ', 2);
        self.serialize(serializer)?;
        Ok(buffer)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum EventError {
    #[error("failed to serialize event XML: {0}")]
    Xml(#[from] quick_xml::SeError),
}
