//! monitor ノードのパース

use super::error::{ManifestError, Result};
use super::{first_string, object_name, parse_properties};
use kdl::KdlNode;
use uptime_operator_core::resource::DEFAULT_MONITOR_INTERVAL_SECS;
use uptime_operator_core::{
    KeywordCheck, KeywordMatch, LabelSelector, Monitor, MonitorSpec, MonitorType, Object,
    ObjectMeta, ObjectSpec, OperatorError, PortCheck, PortService,
};

const KIND: &str = MonitorSpec::KIND;

/// monitor ノードをパース
pub fn parse_monitor(node: &KdlNode, namespace: &str) -> Result<Monitor> {
    let name = object_name(node, KIND)?;
    let mut meta = ObjectMeta::new(namespace, &name);

    let mut spec = MonitorSpec {
        name: name.clone(),
        url: String::new(),
        monitor_type: MonitorType::Http,
        interval: DEFAULT_MONITOR_INTERVAL_SECS,
        alert_contacts: None,
        keyword: None,
        port: None,
    };

    if let Some(children) = node.children() {
        for child in children.nodes() {
            match child.name().value() {
                "labels" => meta.labels = parse_properties(child, KIND, &name)?,
                "name" => {
                    if let Some(friendly_name) = first_string(child) {
                        spec.name = friendly_name;
                    }
                }
                "url" => spec.url = first_string(child).unwrap_or_default(),
                "type" => {
                    let raw = first_string(child).ok_or_else(|| {
                        ManifestError::invalid(KIND, &name, "type requires a value")
                    })?;
                    spec.monitor_type = raw
                        .parse::<MonitorType>()
                        .map_err(|e| ManifestError::invalid(KIND, &name, e.to_string()))?;
                }
                "interval" => {
                    let seconds = child
                        .entries()
                        .first()
                        .and_then(|e| e.value().as_integer())
                        .and_then(|v| u32::try_from(v).ok())
                        .filter(|v| *v > 0)
                        .ok_or_else(|| {
                            ManifestError::invalid(
                                KIND,
                                &name,
                                "interval must be a positive number of seconds",
                            )
                        })?;
                    spec.interval = seconds;
                }
                "keyword" => spec.keyword = Some(parse_keyword(child, &name)?),
                "port" => spec.port = Some(parse_port(child, &name)?),
                "alert-contacts" => {
                    // プロパティなしは全ての alert-contact を選択
                    let labels = parse_properties(child, KIND, &name)?;
                    spec.alert_contacts = Some(LabelSelector {
                        match_labels: labels,
                    });
                }
                other => {
                    return Err(ManifestError::invalid(
                        KIND,
                        &name,
                        format!("unknown field '{}'", other),
                    ));
                }
            }
        }
    }

    spec.validate().map_err(|e| match e {
        OperatorError::Validation(message) => ManifestError::invalid(KIND, &name, message),
        other => ManifestError::invalid(KIND, &name, other.to_string()),
    })?;

    Ok(Object::new(meta, spec))
}

/// `keyword "exists" "Welcome"` / `keyword "not-exists" "Welcome"`
fn parse_keyword(node: &KdlNode, name: &str) -> Result<KeywordCheck> {
    let mut args = node
        .entries()
        .iter()
        .filter(|e| e.name().is_none())
        .map(|e| e.value().as_string());

    match (args.next().flatten(), args.next().flatten()) {
        (Some(alert_when), Some(value)) => Ok(KeywordCheck {
            alert_when: alert_when
                .parse::<KeywordMatch>()
                .map_err(|e| ManifestError::invalid(KIND, name, e.to_string()))?,
            value: value.to_string(),
        }),
        _ => Err(ManifestError::invalid(
            KIND,
            name,
            "keyword requires a match type and a value",
        )),
    }
}

/// `port "https"` / `port "custom" 8443`
fn parse_port(node: &KdlNode, name: &str) -> Result<PortCheck> {
    let mut args = node.entries().iter().filter(|e| e.name().is_none());

    let service = args
        .next()
        .and_then(|e| e.value().as_string())
        .ok_or_else(|| ManifestError::invalid(KIND, name, "port requires a service"))?
        .parse::<PortService>()
        .map_err(|e| ManifestError::invalid(KIND, name, e.to_string()))?;

    let port = match args.next() {
        None => None,
        Some(entry) => Some(
            entry
                .value()
                .as_integer()
                .and_then(|v| u16::try_from(v).ok())
                .filter(|v| *v > 0)
                .ok_or_else(|| {
                    ManifestError::invalid(KIND, name, "port number must be between 1 and 65535")
                })?,
        ),
    };

    Ok(PortCheck { service, port })
}
