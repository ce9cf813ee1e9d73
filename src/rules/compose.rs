use crate::document::Dialect;
use crate::rules::types::{PathPattern, Rule, RuleKind, Severity};
use regex::Regex;

pub fn rules() -> Vec<Rule> {
    vec![
        dc001(),
        dc002(),
        dc003(),
        dc004(),
        dc005(),
        dc006(),
        dc007(),
        dc008(),
    ]
}

fn dc001() -> Rule {
    Rule {
        id: "DC001",
        name: "Privileged container",
        dialect: Dialect::Compose,
        severity: Severity::Critical,
        kind: RuleKind::PatternPresent {
            pattern: Regex::new(r"privileged:\s*true").expect("DC001: invalid regex"),
            exclude: None,
            scope: None,
        },
        message: "Service runs in privileged mode, granting full access to the host.",
        fix_hint: "Remove privileged: true and grant specific capabilities via cap_add instead.",
        compliance: &["CIS-Docker-5.4", "CWE-250"],
    }
}

fn dc002() -> Rule {
    Rule {
        id: "DC002",
        name: "Port published on all interfaces",
        dialect: Dialect::Compose,
        severity: Severity::Critical,
        kind: RuleKind::PatternPresent {
            pattern: Regex::new(r"\d{1,5}:\d{1,5}").expect("DC002: invalid regex"),
            exclude: Some(
                Regex::new(r"127\.0\.0\.1:|\[?::1\]?:|localhost:").expect("DC002: invalid regex"),
            ),
            scope: Some(PathPattern::new("services.*.ports")),
        },
        message: "Port binding listens on all interfaces and is reachable from outside the host.",
        fix_hint: "Bind to the loopback interface: \"127.0.0.1:8080:8080\".",
        compliance: &["CIS-Docker-5.13", "CWE-668"],
    }
}

fn dc003() -> Rule {
    Rule {
        id: "DC003",
        name: "Docker socket mounted",
        dialect: Dialect::Compose,
        severity: Severity::Critical,
        kind: RuleKind::PatternPresent {
            pattern: Regex::new(r"/var/run/docker\.sock").expect("DC003: invalid regex"),
            exclude: None,
            scope: None,
        },
        message: "Mounting the Docker socket gives the container control over the Docker daemon.",
        fix_hint: "Remove the /var/run/docker.sock volume; use a proxy or the API over TLS if needed.",
        compliance: &["CIS-Docker-5.31", "CWE-250"],
    }
}

fn dc004() -> Rule {
    Rule {
        id: "DC004",
        name: "Host namespace sharing",
        dialect: Dialect::Compose,
        severity: Severity::High,
        kind: RuleKind::PatternPresent {
            pattern: Regex::new(r#"(network_mode|pid|ipc):\s*["']?host["']?\s*$"#)
                .expect("DC004: invalid regex"),
            exclude: None,
            scope: None,
        },
        message: "Service shares a host namespace, weakening container isolation.",
        fix_hint: "Drop network_mode/pid/ipc: host; use port mappings and default namespaces.",
        compliance: &["CIS-Docker-5.9", "CIS-Docker-5.15"],
    }
}

fn dc005() -> Rule {
    Rule {
        id: "DC005",
        name: "Missing security_opt hardening",
        dialect: Dialect::Compose,
        severity: Severity::Medium,
        kind: RuleKind::RequiredKeyMissing {
            context: PathPattern::new("services.*"),
            required: PathPattern::new("security_opt"),
        },
        message: "Service does not set security_opt; processes may gain new privileges.",
        fix_hint: "Add security_opt: [\"no-new-privileges:true\"] to the service.",
        compliance: &["CIS-Docker-5.25"],
    }
}

fn dc006() -> Rule {
    Rule {
        id: "DC006",
        name: "Dangerous capability added",
        dialect: Dialect::Compose,
        severity: Severity::High,
        kind: RuleKind::PatternPresent {
            pattern: Regex::new(r"\b(SYS_ADMIN|ALL)\b").expect("DC006: invalid regex"),
            exclude: None,
            scope: Some(PathPattern::new("services.*.cap_add")),
        },
        message: "SYS_ADMIN or ALL capabilities are close to full root on the host.",
        fix_hint: "Grant only the specific capabilities the service needs.",
        compliance: &["CIS-Docker-5.3", "CWE-250"],
    }
}

fn dc007() -> Rule {
    Rule {
        id: "DC007",
        name: "Unpinned image tag",
        dialect: Dialect::Compose,
        severity: Severity::Medium,
        kind: RuleKind::PatternPresent {
            pattern: Regex::new(r#"image:\s*["']?[^\s"':]+(:latest)?["']?\s*$"#)
                .expect("DC007: invalid regex"),
            exclude: Some(Regex::new(r"@sha256:|\$\{").expect("DC007: invalid regex")),
            scope: Some(PathPattern::new("services.*.image")),
        },
        message: "Image has no pinned version tag; builds are not reproducible.",
        fix_hint: "Pin a version: image: nginx:1.25 (or a sha256 digest).",
        compliance: &["CIS-Docker-4.7", "CWE-1357"],
    }
}

fn dc008() -> Rule {
    Rule {
        id: "DC008",
        name: "Sensitive host path mounted",
        dialect: Dialect::Compose,
        severity: Severity::High,
        kind: RuleKind::PatternPresent {
            pattern: Regex::new(r#"-\s*["']?(?:/(?:etc|proc|sys|boot|root|var/run)(?:/[^:]*)?|/):"#)
                .expect("DC008: invalid regex"),
            exclude: None,
            scope: Some(PathPattern::new("services.*.volumes")),
        },
        message: "A sensitive host path is mounted into the container.",
        fix_hint: "Use named volumes or mount a narrowly scoped directory.",
        compliance: &["CIS-Docker-5.6", "CWE-732"],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pattern_hits(rule: &Rule, input: &str) -> bool {
        match &rule.kind {
            RuleKind::PatternPresent {
                pattern, exclude, ..
            } => pattern.is_match(input) && !exclude.as_ref().is_some_and(|e| e.is_match(input)),
            other => panic!("not a pattern rule: {:?}", other),
        }
    }

    #[test]
    fn test_dc001_privileged() {
        let rule = dc001();
        assert!(pattern_hits(&rule, "    privileged: true"));
        assert!(!pattern_hits(&rule, "    privileged: false"));
    }

    #[test]
    fn test_dc002_port_bindings() {
        let rule = dc002();
        let cases = vec![
            ("      - \"8080:8080\"", true),
            ("      - 8080:8080", true),
            ("      - \"0.0.0.0:8080:8080\"", true),
            ("      - \"127.0.0.1:8080:8080\"", false),
            ("      - \"[::1]:8080:8080\"", false),
            ("      - \"localhost:5432:5432\"", false),
        ];
        for (input, expected) in cases {
            assert_eq!(pattern_hits(&rule, input), expected, "input: {}", input);
        }
    }

    #[test]
    fn test_dc004_host_namespaces() {
        let rule = dc004();
        assert!(pattern_hits(&rule, "    network_mode: host"));
        assert!(pattern_hits(&rule, "    pid: \"host\""));
        assert!(pattern_hits(&rule, "    ipc: host"));
        assert!(!pattern_hits(&rule, "    network_mode: bridge"));
        assert!(!pattern_hits(&rule, "    network_mode: hostnet"));
    }

    #[test]
    fn test_dc007_image_tags() {
        let rule = dc007();
        let cases = vec![
            ("    image: nginx", true),
            ("    image: nginx:latest", true),
            ("    image: \"nginx:latest\"", true),
            ("    image: nginx:1.25", false),
            ("    image: nginx@sha256:0d17b565c37bcbd895e9d92315a05c1c3c9a29f762b011a10c54a66cd53c9b31", false),
            ("    image: ${APP_IMAGE}", false),
        ];
        for (input, expected) in cases {
            assert_eq!(pattern_hits(&rule, input), expected, "input: {}", input);
        }
    }

    #[test]
    fn test_dc008_host_mounts() {
        let rule = dc008();
        let cases = vec![
            ("      - /etc:/host/etc", true),
            ("      - /etc/passwd:/host/passwd", true),
            ("      - /:/rootfs:ro", true),
            ("      - /proc:/host/proc", true),
            ("      - \"/var/run/docker.sock:/var/run/docker.sock\"", true),
            ("      - ./config:/app/config", false),
            ("      - data:/var/lib/postgresql/data", false),
        ];
        for (input, expected) in cases {
            assert_eq!(pattern_hits(&rule, input), expected, "input: {}", input);
        }
    }

    #[test]
    fn test_rule_ids_have_compose_prefix() {
        for rule in rules() {
            assert!(rule.id.starts_with("DC"), "bad id: {}", rule.id);
            assert_eq!(rule.dialect, Dialect::Compose);
        }
    }
}
