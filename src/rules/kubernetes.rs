use crate::document::Dialect;
use crate::rules::types::{PathPattern, Rule, RuleKind, Severity};
use regex::Regex;

pub fn rules() -> Vec<Rule> {
    vec![
        ks001(),
        ks002(),
        ks003(),
        ks004(),
        ks005(),
        ks006(),
        ks007(),
        ks008(),
        ks009(),
        ks010(),
    ]
}

fn ks001() -> Rule {
    Rule {
        id: "KS001",
        name: "Privileged container",
        dialect: Dialect::Kubernetes,
        severity: Severity::Critical,
        kind: RuleKind::PatternPresent {
            pattern: Regex::new(r"privileged:\s*true").expect("KS001: invalid regex"),
            exclude: None,
            scope: None,
        },
        message: "Container runs privileged and can access all host devices.",
        fix_hint: "Set privileged: false and add required capabilities explicitly.",
        compliance: &["CIS-Kubernetes-5.2.5", "CWE-250"],
    }
}

fn ks002() -> Rule {
    Rule {
        id: "KS002",
        name: "Privilege escalation allowed",
        dialect: Dialect::Kubernetes,
        severity: Severity::High,
        kind: RuleKind::PatternPresent {
            pattern: Regex::new(r"allowPrivilegeEscalation:\s*true").expect("KS002: invalid regex"),
            exclude: None,
            scope: None,
        },
        message: "Processes in this container may gain more privileges than their parent.",
        fix_hint: "Set allowPrivilegeEscalation: false in the container securityContext.",
        compliance: &["CIS-Kubernetes-5.2.5"],
    }
}

fn ks003() -> Rule {
    Rule {
        id: "KS003",
        name: "Host network enabled",
        dialect: Dialect::Kubernetes,
        severity: Severity::High,
        kind: RuleKind::PatternPresent {
            pattern: Regex::new(r"hostNetwork:\s*true").expect("KS003: invalid regex"),
            exclude: None,
            scope: None,
        },
        message: "Pod shares the node's network namespace.",
        fix_hint: "Remove hostNetwork: true; expose the workload through a Service.",
        compliance: &["CIS-Kubernetes-5.2.4"],
    }
}

fn ks004() -> Rule {
    Rule {
        id: "KS004",
        name: "Host PID/IPC namespace enabled",
        dialect: Dialect::Kubernetes,
        severity: Severity::High,
        kind: RuleKind::PatternPresent {
            pattern: Regex::new(r"host(PID|IPC):\s*true").expect("KS004: invalid regex"),
            exclude: None,
            scope: None,
        },
        message: "Pod shares the node's process or IPC namespace.",
        fix_hint: "Remove hostPID/hostIPC: true from the pod spec.",
        compliance: &["CIS-Kubernetes-5.2.2", "CIS-Kubernetes-5.2.3"],
    }
}

fn ks005() -> Rule {
    Rule {
        id: "KS005",
        name: "hostPath volume",
        dialect: Dialect::Kubernetes,
        severity: Severity::High,
        kind: RuleKind::PatternPresent {
            pattern: Regex::new(r"hostPath:").expect("KS005: invalid regex"),
            exclude: None,
            scope: None,
        },
        message: "hostPath volumes expose the node filesystem to the pod.",
        fix_hint: "Prefer persistentVolumeClaim, configMap, or emptyDir volumes.",
        compliance: &["CIS-Kubernetes-5.2.9", "CWE-668"],
    }
}

fn ks006() -> Rule {
    Rule {
        id: "KS006",
        name: "Dangerous capability added",
        dialect: Dialect::Kubernetes,
        severity: Severity::High,
        kind: RuleKind::PatternPresent {
            pattern: Regex::new(r#"\b(SYS_ADMIN|ALL)\b"#).expect("KS006: invalid regex"),
            exclude: None,
            scope: Some(PathPattern::new("**.capabilities.add")),
        },
        message: "SYS_ADMIN or ALL capabilities defeat container isolation.",
        fix_hint: "Drop broad capabilities; add only the specific ones required.",
        compliance: &["CIS-Kubernetes-5.2.8", "CWE-250"],
    }
}

fn ks007() -> Rule {
    Rule {
        id: "KS007",
        name: "Container may run as root",
        dialect: Dialect::Kubernetes,
        severity: Severity::Medium,
        kind: RuleKind::RequiredKeyMissing {
            context: PathPattern::new("**.containers.*"),
            required: PathPattern::new("securityContext.runAsNonRoot"),
        },
        message: "Container does not set runAsNonRoot and may run as uid 0.",
        fix_hint: "Add securityContext.runAsNonRoot: true to the container.",
        compliance: &["CIS-Kubernetes-5.2.6"],
    }
}

fn ks008() -> Rule {
    Rule {
        id: "KS008",
        name: "Missing resource limits",
        dialect: Dialect::Kubernetes,
        severity: Severity::Low,
        kind: RuleKind::RequiredKeyMissing {
            context: PathPattern::new("**.containers.*"),
            required: PathPattern::new("resources.limits"),
        },
        message: "Container has no resource limits and can starve the node.",
        fix_hint: "Set resources.limits.cpu and resources.limits.memory.",
        compliance: &["CIS-Kubernetes-5.7.3"],
    }
}

fn ks009() -> Rule {
    Rule {
        id: "KS009",
        name: "Service account token auto-mounted",
        dialect: Dialect::Kubernetes,
        severity: Severity::Low,
        kind: RuleKind::PatternPresent {
            pattern: Regex::new(r"automountServiceAccountToken:\s*true").expect("KS009: invalid regex"),
            exclude: None,
            scope: None,
        },
        message: "API credentials are mounted into a pod that may not need them.",
        fix_hint: "Set automountServiceAccountToken: false unless the pod calls the API.",
        compliance: &["CIS-Kubernetes-5.1.6"],
    }
}

fn ks010() -> Rule {
    Rule {
        id: "KS010",
        name: "Unpinned image tag",
        dialect: Dialect::Kubernetes,
        severity: Severity::Medium,
        kind: RuleKind::PatternPresent {
            pattern: Regex::new(r#"image:\s*["']?[^\s"':]+(:latest)?["']?\s*$"#)
                .expect("KS010: invalid regex"),
            exclude: Some(Regex::new(r"@sha256:|\$\{").expect("KS010: invalid regex")),
            scope: Some(PathPattern::new("**.image")),
        },
        message: "Image has no pinned version tag; deployments are not reproducible.",
        fix_hint: "Pin a version tag or digest, e.g. image: nginx:1.25.",
        compliance: &["CWE-1357"],
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
    fn test_ks002_privilege_escalation() {
        let rule = ks002();
        assert!(pattern_hits(&rule, "        allowPrivilegeEscalation: true"));
        assert!(!pattern_hits(&rule, "        allowPrivilegeEscalation: false"));
    }

    #[test]
    fn test_ks004_host_namespaces() {
        let rule = ks004();
        assert!(pattern_hits(&rule, "  hostPID: true"));
        assert!(pattern_hits(&rule, "  hostIPC: true"));
        assert!(!pattern_hits(&rule, "  hostNetwork: true"));
        assert!(!pattern_hits(&rule, "  hostPID: false"));
    }

    #[test]
    fn test_ks010_image_tags() {
        let rule = ks010();
        let cases = vec![
            ("      image: nginx", true),
            ("      image: nginx:latest", true),
            ("      image: nginx:1.25", false),
            ("      image: registry.local/app@sha256:abcd", false),
        ];
        for (input, expected) in cases {
            assert_eq!(pattern_hits(&rule, input), expected, "input: {}", input);
        }
    }

    #[test]
    fn test_rule_ids_have_kubernetes_prefix() {
        for rule in rules() {
            assert!(rule.id.starts_with("KS"), "bad id: {}", rule.id);
            assert_eq!(rule.dialect, Dialect::Kubernetes);
        }
    }
}
