//! KDLマニフェストのパーサー
//!
//! `uptime.kdl` に宣言された alert-contact / monitor / account を
//! 宣言オブジェクトに変換します。

mod alert_contact;
mod error;
mod monitor;

#[cfg(test)]
mod tests;

pub use error::{ManifestError, Result};

use alert_contact::parse_alert_contact;
use kdl::{KdlDocument, KdlNode};
use monitor::parse_monitor;
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::Path;
use uptime_operator_core::{
    Account, AccountSpec, AlertContact, DEFAULT_NAMESPACE, Monitor, Object, ObjectMeta,
    ObjectSpec,
};

/// マニフェストに宣言されたオブジェクト一式
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Manifest {
    pub alert_contacts: Vec<AlertContact>,
    pub monitors: Vec<Monitor>,
    pub accounts: Vec<Account>,
}

impl Manifest {
    pub fn object_count(&self) -> usize {
        self.alert_contacts.len() + self.monitors.len() + self.accounts.len()
    }
}

/// KDLファイルをパースしてManifestを生成
pub fn parse_manifest_file<P: AsRef<Path>>(path: P) -> Result<Manifest> {
    let content = fs::read_to_string(path.as_ref())?;
    parse_manifest_str(&content)
}

/// KDL文字列をパース
pub fn parse_manifest_str(content: &str) -> Result<Manifest> {
    let doc: KdlDocument = content.parse()?;

    let mut manifest = Manifest::default();
    let mut namespace = DEFAULT_NAMESPACE.to_string();

    for node in doc.nodes() {
        match node.name().value() {
            "namespace" => {
                // 以降のノードに適用される
                namespace = first_string(node)
                    .filter(|ns| !ns.is_empty())
                    .ok_or_else(|| {
                        ManifestError::invalid("namespace", "", "namespace requires a name")
                    })?;
            }
            "alert-contact" => {
                manifest
                    .alert_contacts
                    .push(parse_alert_contact(node, &namespace)?);
            }
            "monitor" => {
                manifest.monitors.push(parse_monitor(node, &namespace)?);
            }
            "account" => {
                manifest.accounts.push(parse_account(node, &namespace)?);
            }
            other => return Err(ManifestError::UnknownNode(other.to_string())),
        }
    }

    check_unique(&manifest.alert_contacts)?;
    check_unique(&manifest.monitors)?;
    check_unique(&manifest.accounts)?;

    Ok(manifest)
}

fn parse_account(node: &KdlNode, namespace: &str) -> Result<Account> {
    let name = object_name(node, AccountSpec::KIND)?;
    let mut meta = ObjectMeta::new(namespace, &name);

    if let Some(children) = node.children() {
        for child in children.nodes() {
            match child.name().value() {
                "labels" => meta.labels = parse_properties(child, AccountSpec::KIND, &name)?,
                other => {
                    return Err(ManifestError::invalid(
                        AccountSpec::KIND,
                        &name,
                        format!("unknown field '{}'", other),
                    ));
                }
            }
        }
    }

    Ok(Object::new(meta, AccountSpec {}))
}

fn check_unique<S: ObjectSpec>(objects: &[Object<S>]) -> Result<()> {
    let mut seen = HashSet::new();
    for object in objects {
        let key = object.key();
        if !seen.insert(key.clone()) {
            return Err(ManifestError::Duplicate {
                kind: S::KIND,
                key: key.to_string(),
            });
        }
    }
    Ok(())
}

/// ノードの最初の引数を文字列として取得
pub(crate) fn first_string(node: &KdlNode) -> Option<String> {
    node.entries()
        .first()
        .filter(|e| e.name().is_none())
        .and_then(|e| e.value().as_string())
        .map(|s| s.to_string())
}

/// `kind "name" { ... }` の名前を取得
pub(crate) fn object_name(node: &KdlNode, kind: &'static str) -> Result<String> {
    first_string(node)
        .filter(|n| !n.is_empty())
        .ok_or_else(|| ManifestError::invalid(kind, "", format!("{} requires a name", kind)))
}

/// `labels team="ops" tier="web"` 形式のプロパティを取得
pub(crate) fn parse_properties(
    node: &KdlNode,
    kind: &'static str,
    name: &str,
) -> Result<BTreeMap<String, String>> {
    let mut properties = BTreeMap::new();
    for entry in node.entries() {
        let Some(key) = entry.name() else {
            return Err(ManifestError::invalid(
                kind,
                name,
                format!("'{}' only accepts key=value pairs", node.name().value()),
            ));
        };
        let value = entry.value().as_string().ok_or_else(|| {
            ManifestError::invalid(
                kind,
                name,
                format!("label '{}' must be a string", key.value()),
            )
        })?;
        properties.insert(key.value().to_string(), value.to_string());
    }
    Ok(properties)
}
