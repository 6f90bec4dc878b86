use super::*;
use uptime_operator_core::{
    AlertContactType, KeywordCheck, KeywordMatch, LabelSelector, MonitorType, ObjectKey, PortCheck,
    PortService,
};

#[test]
fn test_parse_full_manifest() {
    let kdl = r#"
        namespace "prod"

        alert-contact "ops-mail" {
            labels team="ops"
            type "email"
            value "ops@example.com"
            name "Ops mail"
        }

        alert-contact "ops-slack" {
            labels team="ops" channel="chat"
            type "slack"
            value "https://hooks.slack.com/services/T000/B000/XXX"
        }

        monitor "homepage" {
            name "Homepage"
            url "https://example.com"
            type "keyword"
            keyword "not-exists" "Welcome"
            interval 60
            alert-contacts team="ops"
        }

        account "main"
    "#;

    let manifest = parse_manifest_str(kdl).unwrap();
    assert_eq!(manifest.object_count(), 4);

    let mail = &manifest.alert_contacts[0];
    assert_eq!(mail.key(), ObjectKey::new("prod", "ops-mail"));
    assert_eq!(mail.spec.name, "Ops mail");
    assert_eq!(mail.spec.contact_type, AlertContactType::Email);
    assert_eq!(mail.metadata.labels["team"], "ops");

    // name を省略するとオブジェクト名が使われる
    let slack = &manifest.alert_contacts[1];
    assert_eq!(slack.spec.name, "ops-slack");
    assert_eq!(slack.metadata.labels.len(), 2);

    let monitor = &manifest.monitors[0];
    assert_eq!(monitor.spec.monitor_type, MonitorType::Keyword);
    assert_eq!(
        monitor.spec.keyword,
        Some(KeywordCheck {
            alert_when: KeywordMatch::NotExists,
            value: "Welcome".to_string(),
        })
    );
    assert_eq!(monitor.spec.interval, 60);
    assert_eq!(
        monitor.spec.alert_contacts,
        Some(LabelSelector::new().with_label("team", "ops"))
    );

    assert_eq!(manifest.accounts[0].key(), ObjectKey::new("prod", "main"));
}

#[test]
fn test_monitor_defaults() {
    let kdl = r#"
        monitor "api" {
            url "https://api.example.com/health"
        }
    "#;

    let manifest = parse_manifest_str(kdl).unwrap();
    let monitor = &manifest.monitors[0];
    assert_eq!(monitor.metadata.namespace, "default");
    assert_eq!(monitor.spec.name, "api");
    assert_eq!(monitor.spec.monitor_type, MonitorType::Http);
    assert_eq!(monitor.spec.interval, 300);
    assert_eq!(monitor.spec.alert_contacts, None);
}

#[test]
fn test_empty_alert_contacts_selects_all() {
    let kdl = r#"
        monitor "api" {
            url "https://api.example.com"
            alert-contacts
        }
    "#;

    let manifest = parse_manifest_str(kdl).unwrap();
    assert_eq!(
        manifest.monitors[0].spec.alert_contacts,
        Some(LabelSelector::new())
    );
}

#[test]
fn test_unknown_alert_contact_type() {
    let kdl = r#"
        alert-contact "pager" {
            type "carrier-pigeon"
            value "coop 7"
        }
    "#;

    let err = parse_manifest_str(kdl).unwrap_err();
    match err {
        ManifestError::Invalid { kind, name, .. } => {
            assert_eq!(kind, "alert-contact");
            assert_eq!(name, "pager");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_missing_value_is_rejected() {
    let kdl = r#"
        alert-contact "ops" {
            type "email"
        }
    "#;

    assert!(matches!(
        parse_manifest_str(kdl),
        Err(ManifestError::Invalid { .. })
    ));
}

#[test]
fn test_monitor_requires_url_unless_heartbeat() {
    let missing = r#"
        monitor "api" {
            type "http"
        }
    "#;
    assert!(parse_manifest_str(missing).is_err());

    let heartbeat = r#"
        monitor "cron" {
            type "heartbeat"
            interval 3600
        }
    "#;
    let manifest = parse_manifest_str(heartbeat).unwrap();
    assert_eq!(manifest.monitors[0].spec.monitor_type, MonitorType::Heartbeat);
}

#[test]
fn test_keyword_monitor_requires_keyword() {
    let missing = r#"
        monitor "landing" {
            url "https://example.com"
            type "keyword"
        }
    "#;
    assert!(matches!(
        parse_manifest_str(missing),
        Err(ManifestError::Invalid { .. })
    ));

    let misplaced = r#"
        monitor "landing" {
            url "https://example.com"
            keyword "exists" "Welcome"
        }
    "#;
    assert!(parse_manifest_str(misplaced).is_err());

    let bad_match = r#"
        monitor "landing" {
            url "https://example.com"
            type "keyword"
            keyword "sometimes" "Welcome"
        }
    "#;
    assert!(parse_manifest_str(bad_match).is_err());
}

#[test]
fn test_port_monitor_settings() {
    let kdl = r#"
        monitor "mail" {
            url "mail.example.com"
            type "port"
            port "smtp"
        }

        monitor "gateway" {
            url "gw.example.com"
            type "port"
            port "custom" 8443
        }
    "#;

    let manifest = parse_manifest_str(kdl).unwrap();
    assert_eq!(
        manifest.monitors[0].spec.port,
        Some(PortCheck {
            service: PortService::Smtp,
            port: None,
        })
    );
    assert_eq!(
        manifest.monitors[1].spec.port,
        Some(PortCheck {
            service: PortService::Custom,
            port: Some(8443),
        })
    );
}

#[test]
fn test_invalid_port_settings() {
    for body in [
        r#"type "port""#,
        r#"type "port"
           port "custom""#,
        r#"type "port"
           port "https" 443"#,
        r#"type "port"
           port "custom" 70000"#,
        r#"port "https""#,
    ] {
        let kdl = format!("monitor \"gw\" {{\n url \"gw.example.com\"\n {body}\n}}");
        assert!(
            matches!(parse_manifest_str(&kdl), Err(ManifestError::Invalid { .. })),
            "accepted: {body}"
        );
    }
}

#[test]
fn test_invalid_interval() {
    let kdl = r#"
        monitor "api" {
            url "https://example.com"
            interval 0
        }
    "#;
    assert!(parse_manifest_str(kdl).is_err());
}

#[test]
fn test_unknown_node() {
    let kdl = r#"
        status-page "public" {}
    "#;

    assert!(matches!(
        parse_manifest_str(kdl),
        Err(ManifestError::UnknownNode(node)) if node == "status-page"
    ));
}

#[test]
fn test_duplicate_declaration() {
    let kdl = r#"
        account "main"
        account "main"
    "#;

    assert!(matches!(
        parse_manifest_str(kdl),
        Err(ManifestError::Duplicate { kind: "account", .. })
    ));
}

#[test]
fn test_same_name_in_other_namespace_is_allowed() {
    let kdl = r#"
        account "main"
        namespace "staging"
        account "main"
    "#;

    let manifest = parse_manifest_str(kdl).unwrap();
    assert_eq!(manifest.accounts.len(), 2);
    assert_eq!(manifest.accounts[1].metadata.namespace, "staging");
}

#[test]
fn test_parse_manifest_file() {
    let temp_dir = tempfile::tempdir().unwrap();
    let path = temp_dir.path().join("uptime.kdl");
    std::fs::write(&path, "account \"main\"\n").unwrap();

    let manifest = parse_manifest_file(&path).unwrap();
    assert_eq!(manifest.accounts.len(), 1);
}
