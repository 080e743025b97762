use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// One normalized finding about a single resource instance.
///
/// Records are written to the record stream as they are discovered and are
/// never updated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveryRecord {
    /// The resource-specific payload, tagged with its `kind`.
    #[serde(flatten)]
    pub resource: Resource,

    /// Account that owns the resource, when the session knows it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account: Option<String>,
}

impl DiscoveryRecord {
    pub fn new(resource: Resource, account: Option<&str>) -> Self {
        Self { resource, account: account.map(str::to_string) }
    }

    pub fn kind(&self) -> Kind {
        self.resource.kind()
    }
}

/// Resource payloads, one variant per record kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Resource {
    /// An A/AAAA/CNAME/ALIAS record set in a public hosted zone.
    DnsRecord {
        /// Hosted zone identifier.
        zone: String,
        /// Record name without the trailing dot.
        name: String,
        /// Record type as reported by the zone.
        #[serde(rename = "type")]
        record_type: String,
        /// Absent for alias records.
        ttl: Option<i64>,
        /// Record values, or the alias target for alias records.
        #[serde(default)]
        values: Vec<String>,
    },

    /// An application, network or gateway load balancer.
    LoadBalancer {
        name: String,
        dns: String,
        /// `internet-facing` or `internal`.
        scheme: String,
        #[serde(rename = "type")]
        lb_type: String,
        region: String,
        /// Best-effort; empty when the tag lookup failed.
        #[serde(default)]
        tags: BTreeMap<String, String>,
    },

    /// A custom domain registered with the original API gateway service.
    ApigwV1Domain { domain: String, region: String },

    /// A custom domain registered with the HTTP/WebSocket API gateway service.
    ApigwV2Domain { domain: String, region: String },

    /// A CDN distribution with its default domain and alternate names.
    CdnDistribution {
        id: String,
        domain: String,
        #[serde(default)]
        alts: Vec<String>,
        /// Whether any origin is protected by an origin access control.
        oac: bool,
    },

    /// A global accelerator and its assigned DNS name.
    GlobalAccelerator { dns: String, enabled: bool },

    /// A bucket with static website hosting enabled.
    S3Website { bucket: String, endpoint: String, region: String },

    /// A running instance holding a public IP address.
    PublicInstance { ip: String, region: String, instance_id: String },

    /// An allocated elastic IP address.
    ElasticIp {
        ip: String,
        region: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        allocation_id: Option<String>,
    },

    /// An issued certificate. Its names are never registered as hosts.
    Certificate {
        domain: Option<String>,
        #[serde(default)]
        alt: Vec<String>,
        region: String,
    },
}

/// Record kind, matching the `kind` tag written to the record stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, EnumIter, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum Kind {
    DnsRecord,
    LoadBalancer,
    ApigwV1Domain,
    ApigwV2Domain,
    CdnDistribution,
    GlobalAccelerator,
    S3Website,
    PublicInstance,
    ElasticIp,
    Certificate,
}

impl Resource {
    pub fn kind(&self) -> Kind {
        match self {
            Resource::DnsRecord { .. } => Kind::DnsRecord,
            Resource::LoadBalancer { .. } => Kind::LoadBalancer,
            Resource::ApigwV1Domain { .. } => Kind::ApigwV1Domain,
            Resource::ApigwV2Domain { .. } => Kind::ApigwV2Domain,
            Resource::CdnDistribution { .. } => Kind::CdnDistribution,
            Resource::GlobalAccelerator { .. } => Kind::GlobalAccelerator,
            Resource::S3Website { .. } => Kind::S3Website,
            Resource::PublicInstance { .. } => Kind::PublicInstance,
            Resource::ElasticIp { .. } => Kind::ElasticIp,
            Resource::Certificate { .. } => Kind::Certificate,
        }
    }

    /// Names and addresses this resource contributes to the host registry.
    ///
    /// Certificates contribute nothing: a certificate names hosts that may
    /// not exist.
    pub fn hosts(&self) -> Vec<&str> {
        match self {
            Resource::DnsRecord { name, .. } => vec![name.as_str()],
            Resource::LoadBalancer { dns, .. } | Resource::GlobalAccelerator { dns, .. } => {
                vec![dns.as_str()]
            }
            Resource::ApigwV1Domain { domain, .. } | Resource::ApigwV2Domain { domain, .. } => {
                vec![domain.as_str()]
            }
            Resource::CdnDistribution { domain, alts, .. } => {
                std::iter::once(domain.as_str()).chain(alts.iter().map(String::as_str)).collect()
            }
            Resource::S3Website { endpoint, .. } => vec![endpoint.as_str()],
            Resource::PublicInstance { ip, .. } | Resource::ElasticIp { ip, .. } => {
                vec![ip.as_str()]
            }
            Resource::Certificate { .. } => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::{json, Value};
    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn dns_record_serializes_with_kind_tag_and_null_alias_ttl() {
        let record = DiscoveryRecord::new(
            Resource::DnsRecord {
                zone: "Z123".into(),
                name: "app.example.com".into(),
                record_type: "A".into(),
                ttl: None,
                values: vec!["dualstack.lb.amazonaws.com".into()],
            },
            Some("111122223333"),
        );

        let value: Value = serde_json::to_value(&record).unwrap();
        assert_eq!(
            value,
            json!({
                "kind": "dns_record",
                "zone": "Z123",
                "name": "app.example.com",
                "type": "A",
                "ttl": null,
                "values": ["dualstack.lb.amazonaws.com"],
                "account": "111122223333",
            })
        );
    }

    #[test]
    fn account_is_omitted_when_unknown() {
        let record = DiscoveryRecord::new(
            Resource::GlobalAccelerator { dns: "a1.awsglobalaccelerator.com".into(), enabled: true },
            None,
        );
        let line = serde_json::to_string(&record).unwrap();
        assert!(!line.contains("account"));
        assert!(line.starts_with(r#"{"kind":"global_accelerator""#));
    }

    #[test]
    fn record_reads_back_from_its_json_line() {
        let record = DiscoveryRecord::new(
            Resource::LoadBalancer {
                name: "web".into(),
                dns: "web-1.us-east-1.elb.amazonaws.com".into(),
                scheme: "internet-facing".into(),
                lb_type: "application".into(),
                region: "us-east-1".into(),
                tags: BTreeMap::from([("kubernetes.io/service-name".into(), "ns/web".into())]),
            },
            Some("111122223333"),
        );
        let line = serde_json::to_string(&record).unwrap();
        let parsed: DiscoveryRecord = serde_json::from_str(&line).unwrap();
        assert_eq!(parsed, record);
    }

    #[test]
    fn kind_display_matches_serialized_tag() {
        let resource = Resource::ApigwV2Domain { domain: "api.example.com".into(), region: "eu-west-1".into() };
        let value = serde_json::to_value(&resource).unwrap();
        assert_eq!(value["kind"], Value::String(resource.kind().to_string()));
        assert_eq!(Kind::iter().count(), 10);
        assert_eq!("s3_website".parse::<Kind>().unwrap(), Kind::S3Website);
    }

    #[test]
    fn certificates_contribute_no_hosts() {
        let resource = Resource::Certificate {
            domain: Some("example.com".into()),
            alt: vec!["*.example.com".into()],
            region: "us-east-1".into(),
        };
        assert!(resource.hosts().is_empty());
    }

    #[test]
    fn distribution_contributes_default_domain_and_every_alias() {
        let resource = Resource::CdnDistribution {
            id: "E1".into(),
            domain: "d111.cloudfront.net".into(),
            alts: vec!["www.example.com".into(), "cdn.example.com".into()],
            oac: false,
        };
        assert_eq!(resource.hosts(), vec!["d111.cloudfront.net", "www.example.com", "cdn.example.com"]);
    }
}
