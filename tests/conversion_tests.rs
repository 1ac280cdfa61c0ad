//! End-to-end conversion of small generated topologies.

use scion_kathara::config::ConvertConfig;
use scion_kathara::orchestrator::run_conversion;
use scion_kathara::ConvertError;
use serde_json::{json, Value};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const BR_TOML: &str = r#"
[general]
id = "br1-ff00_0_NUM-1"
config_dir = "gen/ASff00_0_NUM"

[tracing]
enabled = true

[metrics]
prometheus = "127.0.0.2:30442"

[api]
addr = "127.0.0.2:31442"
"#;

const CS_TOML: &str = r#"
[general]
id = "cs1-ff00_0_NUM-1"
config_dir = "gen/ASff00_0_NUM"

[trust_db]
connection = "gen-cache/cs1-ff00_0_NUM-1.trust.db"

[tracing]
enabled = true

[metrics]
prometheus = "127.0.0.3:30454"

[api]
addr = "127.0.0.3:31152"
"#;

const SD_TOML: &str = r#"
[general]
id = "sd1-ff00_0_NUM"
config_dir = "gen/ASff00_0_NUM"

[sd]
address = "127.0.0.4:30255"

[tracing]
enabled = true

[metrics]
prometheus = "127.0.0.4:30455"
"#;

/// Write one AS directory. `border_routers` is the raw `border_routers`
/// object of its topology.
fn write_as(gen: &Path, num: u32, border_routers: Value) {
    let as_dir = gen.join(format!("ASff00_0_{}", num));
    for dir in ["certs", "crypto/as", "keys"] {
        fs::create_dir_all(as_dir.join(dir)).unwrap();
    }
    fs::write(as_dir.join("keys").join("master0.key"), format!("key-{}", num)).unwrap();
    fs::write(as_dir.join("crypto").join("as").join("cp-as.pem"), "pem").unwrap();

    let num_str = num.to_string();
    fs::write(as_dir.join(format!("br1-ff00_0_{}-1.toml", num)), BR_TOML.replace("NUM", &num_str)).unwrap();
    fs::write(as_dir.join(format!("cs1-ff00_0_{}-1.toml", num)), CS_TOML.replace("NUM", &num_str)).unwrap();
    fs::write(as_dir.join("sd.toml"), SD_TOML.replace("NUM", &num_str)).unwrap();

    let cs_name = format!("cs1-ff00_0_{}-1", num);
    let topology = json!({
        "attributes": ["core"],
        "isd_as": format!("1-ff00:0:{}", num),
        "mtu": 1472,
        "test_dispatcher": { "addr": "127.0.0.1:30041" },
        "control_service": { cs_name.clone(): { "addr": "127.0.0.3:31000" } },
        "discovery_service": { cs_name: { "addr": "127.0.0.3:31000" } },
        "border_routers": border_routers
    });
    fs::write(
        as_dir.join("topology.json"),
        serde_json::to_string_pretty(&topology).unwrap(),
    )
    .unwrap();
}

fn link(peer: u32, local: &str, remote: &str) -> Value {
    json!({
        "isd_as": format!("1-ff00:0:{}", peer),
        "link_to": "core",
        "mtu": 1280,
        "underlay": { "local": local, "remote": remote }
    })
}

fn convert(root: &TempDir) -> (ConvertConfig, scion_kathara::orchestrator::ConversionReport) {
    let config = ConvertConfig {
        source: root.path().join("gen"),
        output: root.path().join("KatharaLab"),
        ..ConvertConfig::default()
    };
    let report = run_conversion(&config).unwrap();
    (config, report)
}

fn node_dir(config: &ConvertConfig, node: &str) -> PathBuf {
    config.output.join(node).join("etc").join("scion")
}

fn read_topology(config: &ConvertConfig, node: &str) -> Value {
    let content = fs::read_to_string(node_dir(config, node).join("topology.json")).unwrap();
    serde_json::from_str(&content).unwrap()
}

fn underlay(topology: &Value, interface_id: &str) -> (String, String) {
    let underlay = &topology["border_routers"]["br"]["interfaces"][interface_id]["underlay"];
    (
        underlay["local"].as_str().unwrap().to_string(),
        underlay["remote"].as_str().unwrap().to_string(),
    )
}

#[test]
fn test_two_nodes_share_one_link_port() {
    let root = TempDir::new().unwrap();
    let gen = root.path().join("gen");
    write_as(&gen, 110, json!({
        "br1-ff00_0_110-1": {
            "internal_addr": "127.0.0.2:31002",
            "interfaces": { "1": link(111, "127.0.0.4:50012", "127.0.0.5:50013") }
        }
    }));
    write_as(&gen, 111, json!({
        "br1-ff00_0_111-1": {
            "internal_addr": "127.0.0.2:31004",
            "interfaces": { "1": link(110, "127.0.0.5:50013", "127.0.0.4:50012") }
        }
    }));

    let (config, report) = convert(&root);
    assert_eq!(report.nodes.len(), 2);
    assert_eq!(report.links.len(), 1);
    assert!(report.warnings().is_empty());

    let as_110 = read_topology(&config, "as_110");
    let as_111 = read_topology(&config, "as_111");
    assert_eq!(
        underlay(&as_110, "1"),
        ("10.0.0.110:50000".to_string(), "10.0.0.111:50000".to_string())
    );
    assert_eq!(
        underlay(&as_111, "1"),
        ("10.0.0.111:50000".to_string(), "10.0.0.110:50000".to_string())
    );
    assert_eq!(as_110["border_routers"]["br"]["internal_addr"], "10.0.0.110:31002");
    assert_eq!(as_111["control_service"]["cs1-ff00_0_111-1"]["addr"], "10.0.0.111:31000");
    assert!(as_110.get("test_dispatcher").is_none());
}

#[test]
fn test_parallel_links_and_multiple_border_routers() {
    let root = TempDir::new().unwrap();
    let gen = root.path().join("gen");
    write_as(&gen, 110, json!({
        "br1-ff00_0_110-1": {
            "internal_addr": "127.0.0.2:31002",
            "interfaces": {
                "1": link(111, "127.0.0.4:1", "127.0.0.5:1"),
                "2": link(112, "127.0.0.4:2", "127.0.0.6:2")
            }
        },
        "br1-ff00_0_110-2": {
            "internal_addr": "127.0.0.7:31004",
            "interfaces": { "3": link(111, "127.0.0.7:3", "127.0.0.5:3") }
        }
    }));
    write_as(&gen, 111, json!({
        "br1-ff00_0_111-1": {
            "internal_addr": "127.0.0.2:31002",
            "interfaces": {
                "10": link(110, "127.0.0.5:1", "127.0.0.4:1"),
                "11": link(110, "127.0.0.5:3", "127.0.0.7:3")
            }
        }
    }));
    write_as(&gen, 112, json!({
        "br1-ff00_0_112-1": {
            "internal_addr": "127.0.0.2:31002",
            "interfaces": { "20": link(110, "127.0.0.6:2", "127.0.0.4:2") }
        }
    }));

    let (config, report) = convert(&root);
    assert_eq!(report.links.len(), 3);

    let as_110 = read_topology(&config, "as_110");
    let brs = as_110["border_routers"].as_object().unwrap();
    assert_eq!(brs.len(), 1);
    assert_eq!(brs["br"]["interfaces"].as_object().unwrap().len(), 3);
    assert_eq!(brs["br"]["internal_addr"], "10.0.0.110:31004");

    let summary = report.nodes[0].topology.as_ref().unwrap();
    assert_eq!(summary.border_routers, 2);
    assert_eq!(summary.interfaces, 3);

    let as_111 = read_topology(&config, "as_111");
    let as_112 = read_topology(&config, "as_112");

    // first 110-111 link, then 110-112, then the parallel 110-111 link
    assert_eq!(underlay(&as_110, "1").0, "10.0.0.110:50000");
    assert_eq!(underlay(&as_110, "2").0, "10.0.0.110:50001");
    assert_eq!(underlay(&as_110, "3").0, "10.0.0.110:50002");

    for (ours, theirs, topology) in [("1", "10", &as_111), ("3", "11", &as_111), ("2", "20", &as_112)] {
        let (local, remote) = underlay(&as_110, ours);
        let (peer_local, peer_remote) = underlay(topology, theirs);
        assert_eq!(local, peer_remote);
        assert_eq!(remote, peer_local);
    }
}

#[test]
fn test_service_files_rewritten_and_credentials_copied() {
    let root = TempDir::new().unwrap();
    let gen = root.path().join("gen");
    write_as(&gen, 110, json!({}));
    fs::create_dir_all(gen.join("certs")).unwrap();

    let (config, report) = convert(&root);
    assert_eq!(report.nodes.len(), 1);

    let dir = node_dir(&config, "as_110");
    assert_eq!(fs::read_to_string(dir.join("keys").join("master0.key")).unwrap(), "key-110");
    assert!(dir.join("crypto").join("as").join("cp-as.pem").is_file());
    assert!(dir.join("certs").is_dir());

    for file in ["br.toml", "cs.toml", "sd.toml"] {
        let content = fs::read_to_string(dir.join(file)).unwrap();
        let table: toml::Table = toml::from_str(&content).unwrap();
        assert!(!table.contains_key("metrics"), "{} still has metrics", file);
        assert!(!table.contains_key("tracing"), "{} still has tracing", file);
        assert_eq!(table["general"]["config_dir"].as_str(), Some("/etc/scion/"));
    }

    let br: toml::Table = toml::from_str(&fs::read_to_string(dir.join("br.toml")).unwrap()).unwrap();
    assert_eq!(br["general"]["id"].as_str(), Some("br"));
    assert_eq!(br["api"]["addr"].as_str(), Some("10.0.0.110:31442"));

    let cs: toml::Table = toml::from_str(&fs::read_to_string(dir.join("cs.toml")).unwrap()).unwrap();
    assert_eq!(cs["trust_db"]["connection"].as_str(), Some("/etc/scion/trust.db"));

    let sd: toml::Table = toml::from_str(&fs::read_to_string(dir.join("sd.toml")).unwrap()).unwrap();
    assert_eq!(sd["sd"]["address"].as_str(), Some("10.0.0.110:30255"));

    let topology = read_topology(&config, "as_110");
    assert!(topology["border_routers"]["br"]["interfaces"].as_object().unwrap().is_empty());
}

#[test]
fn test_lab_files_generated() {
    let root = TempDir::new().unwrap();
    let gen = root.path().join("gen");
    write_as(&gen, 111, json!({}));
    write_as(&gen, 110, json!({}));

    let (config, report) = convert(&root);
    assert_eq!(report.lab_files.len(), 3);

    let lab_conf = fs::read_to_string(config.output.join("lab.conf")).unwrap();
    assert!(lab_conf.contains("as_110[image]=\"kathara/scion-local\""));
    assert!(lab_conf.find("as_110[0]").unwrap() < lab_conf.find("as_111[0]").unwrap());

    let startup = fs::read_to_string(config.output.join("as_111.startup")).unwrap();
    assert!(startup.contains("ip address add 10.0.0.111/24 dev eth0"));
    assert!(startup.contains("ip address add 192.168.0.111/24 dev eth1"));
}

#[test]
fn test_missing_sub_resources_are_warnings() {
    let root = TempDir::new().unwrap();
    let as_dir = root.path().join("gen").join("ASff00_0_110");
    fs::create_dir_all(&as_dir).unwrap();
    fs::write(as_dir.join("sd.toml"), SD_TOML.replace("NUM", "110")).unwrap();

    let (config, report) = convert(&root);
    let warnings = report.warnings();
    assert!(warnings.contains(&"as_110: keys/ not found".to_string()));
    assert!(warnings.contains(&"as_110: no br.toml source found".to_string()));
    assert!(warnings.contains(&"as_110: topology.json not found".to_string()));
    assert!(node_dir(&config, "as_110").join("sd.toml").is_file());
    assert!(config.output.join("lab.conf").is_file());
}

#[test]
fn test_missing_source_is_fatal() {
    let root = TempDir::new().unwrap();
    let config = ConvertConfig {
        source: root.path().join("gen"),
        output: root.path().join("KatharaLab"),
        ..ConvertConfig::default()
    };
    assert!(matches!(run_conversion(&config), Err(ConvertError::SourceMissing { .. })));
}

#[test]
fn test_no_nodes_is_fatal() {
    let root = TempDir::new().unwrap();
    fs::create_dir_all(root.path().join("gen").join("ISD1")).unwrap();
    let config = ConvertConfig {
        source: root.path().join("gen"),
        output: root.path().join("KatharaLab"),
        ..ConvertConfig::default()
    };
    assert!(matches!(run_conversion(&config), Err(ConvertError::NoNodes { .. })));
    assert!(!config.output.exists());
}
