//! alert-contact ノードのパース

use super::error::{ManifestError, Result};
use super::{first_string, object_name, parse_properties};
use kdl::KdlNode;
use uptime_operator_core::{
    AlertContact, AlertContactSpec, AlertContactType, Object, ObjectMeta, ObjectSpec,
};

const KIND: &str = AlertContactSpec::KIND;

/// alert-contact ノードをパース
pub fn parse_alert_contact(node: &KdlNode, namespace: &str) -> Result<AlertContact> {
    let name = object_name(node, KIND)?;
    let mut meta = ObjectMeta::new(namespace, &name);

    let mut friendly_name = None;
    let mut contact_type = None;
    let mut value = None;

    if let Some(children) = node.children() {
        for child in children.nodes() {
            match child.name().value() {
                "labels" => meta.labels = parse_properties(child, KIND, &name)?,
                "name" => friendly_name = first_string(child),
                "type" => {
                    let raw = first_string(child).ok_or_else(|| {
                        ManifestError::invalid(KIND, &name, "type requires a value")
                    })?;
                    let parsed = raw
                        .parse::<AlertContactType>()
                        .map_err(|e| ManifestError::invalid(KIND, &name, e.to_string()))?;
                    contact_type = Some(parsed);
                }
                "value" => value = first_string(child),
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

    let contact_type =
        contact_type.ok_or_else(|| ManifestError::invalid(KIND, &name, "type is required"))?;
    let value = value
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ManifestError::invalid(KIND, &name, "value is required"))?;

    let spec = AlertContactSpec {
        name: friendly_name.unwrap_or_else(|| name.clone()),
        contact_type,
        value,
    };

    Ok(Object::new(meta, spec))
}
