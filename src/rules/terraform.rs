use crate::document::Dialect;
use crate::rules::types::{PathPattern, Rule, RuleKind, Severity};
use regex::Regex;

pub fn rules() -> Vec<Rule> {
    vec![tf001(), tf002(), tf003(), tf004(), tf005(), tf006(), tf007()]
}

fn tf001() -> Rule {
    Rule {
        id: "TF001",
        name: "Unencrypted EBS volume",
        dialect: Dialect::Terraform,
        severity: Severity::High,
        kind: RuleKind::AttributeMissingInBlock {
            block_type: "aws_ebs_volume",
            required_expr: Regex::new(r"encrypted\s*=\s*true").expect("TF001: invalid regex"),
        },
        message: "EBS volume is not encrypted at rest.",
        fix_hint: "Add encrypted = true to the aws_ebs_volume block.",
        compliance: &["CIS-AWS-2.2.1", "CWE-311"],
    }
}

fn tf002() -> Rule {
    Rule {
        id: "TF002",
        name: "Public S3 bucket ACL",
        dialect: Dialect::Terraform,
        severity: Severity::Critical,
        kind: RuleKind::PatternPresent {
            pattern: Regex::new(r#"acl\s*=\s*"public-read(-write)?""#)
                .expect("TF002: invalid regex"),
            exclude: None,
            scope: None,
        },
        message: "S3 bucket ACL makes objects publicly readable.",
        fix_hint: "Use acl = \"private\" and grant access through bucket policies.",
        compliance: &["CIS-AWS-2.1.5", "CWE-284"],
    }
}

fn tf003() -> Rule {
    Rule {
        id: "TF003",
        name: "Security group open to the world",
        dialect: Dialect::Terraform,
        severity: Severity::High,
        kind: RuleKind::PatternPresent {
            pattern: Regex::new(r#""(0\.0\.0\.0/0|::/0)""#).expect("TF003: invalid regex"),
            exclude: None,
            scope: Some(PathPattern::new("**.ingress.*")),
        },
        message: "Ingress rule accepts traffic from any address.",
        fix_hint: "Restrict cidr_blocks to known networks.",
        compliance: &["CIS-AWS-4.1", "CWE-284"],
    }
}

fn tf004() -> Rule {
    Rule {
        id: "TF004",
        name: "Unencrypted RDS storage",
        dialect: Dialect::Terraform,
        severity: Severity::High,
        kind: RuleKind::AttributeMissingInBlock {
            block_type: "aws_db_instance",
            required_expr: Regex::new(r"storage_encrypted\s*=\s*true")
                .expect("TF004: invalid regex"),
        },
        message: "RDS instance storage is not encrypted at rest.",
        fix_hint: "Add storage_encrypted = true to the aws_db_instance block.",
        compliance: &["CIS-AWS-2.3.1", "CWE-311"],
    }
}

fn tf005() -> Rule {
    Rule {
        id: "TF005",
        name: "Publicly accessible database",
        dialect: Dialect::Terraform,
        severity: Severity::Critical,
        kind: RuleKind::PatternPresent {
            pattern: Regex::new(r"publicly_accessible\s*=\s*true").expect("TF005: invalid regex"),
            exclude: None,
            scope: None,
        },
        message: "Database instance is reachable from the public internet.",
        fix_hint: "Set publicly_accessible = false and connect through a VPC.",
        compliance: &["CIS-AWS-2.3.2", "CWE-284"],
    }
}

fn tf006() -> Rule {
    Rule {
        id: "TF006",
        name: "S3 bucket without server-side encryption",
        dialect: Dialect::Terraform,
        severity: Severity::Medium,
        kind: RuleKind::AttributeMissingInBlock {
            block_type: "aws_s3_bucket",
            required_expr: Regex::new(r"server_side_encryption").expect("TF006: invalid regex"),
        },
        message: "S3 bucket does not configure server-side encryption.",
        fix_hint: "Add a server_side_encryption_configuration block (or a matching aws_s3_bucket_server_side_encryption_configuration resource).",
        compliance: &["CIS-AWS-2.1.1", "CWE-311"],
    }
}

fn tf007() -> Rule {
    Rule {
        id: "TF007",
        name: "CloudTrail log validation disabled",
        dialect: Dialect::Terraform,
        severity: Severity::Low,
        kind: RuleKind::AttributeMissingInBlock {
            block_type: "aws_cloudtrail",
            required_expr: Regex::new(r"enable_log_file_validation\s*=\s*true")
                .expect("TF007: invalid regex"),
        },
        message: "CloudTrail trail does not validate log file integrity.",
        fix_hint: "Add enable_log_file_validation = true to the aws_cloudtrail block.",
        compliance: &["CIS-AWS-3.2"],
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
    fn test_tf002_public_acls() {
        let rule = tf002();
        assert!(pattern_hits(&rule, "  acl = \"public-read\""));
        assert!(pattern_hits(&rule, "  acl = \"public-read-write\""));
        assert!(!pattern_hits(&rule, "  acl = \"private\""));
    }

    #[test]
    fn test_tf003_world_open_cidrs() {
        let rule = tf003();
        assert!(pattern_hits(&rule, "    cidr_blocks = [\"0.0.0.0/0\"]"));
        assert!(pattern_hits(&rule, "    ipv6_cidr_blocks = [\"::/0\"]"));
        assert!(!pattern_hits(&rule, "    cidr_blocks = [\"10.0.0.0/8\"]"));
    }

    #[test]
    fn test_tf005_public_database() {
        let rule = tf005();
        assert!(pattern_hits(&rule, "  publicly_accessible = true"));
        assert!(!pattern_hits(&rule, "  publicly_accessible = false"));
    }

    #[test]
    fn test_rule_ids_have_terraform_prefix() {
        for rule in rules() {
            assert!(rule.id.starts_with("TF"), "bad id: {}", rule.id);
            assert_eq!(rule.dialect, Dialect::Terraform);
        }
    }
}
