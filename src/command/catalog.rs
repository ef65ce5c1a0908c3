//! Closed catalog of supported command families
//!
//! A family is a (service path, verb) pair such as `compute instance` +
//! `terminate`. Each entry fixes the canonical template and the minimal
//! set of fields the command needs. The synthesizer never invents fields:
//! a family that is not listed here cannot produce a command.

/// One supported OCI CLI command family
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandFamily {
    /// Service and resource path, e.g. `os bucket`
    pub service: &'static str,
    /// Operation verb, e.g. `list`
    pub verb: &'static str,
    /// Canonical placeholder-only template
    pub template: &'static str,
    /// Minimal required fields, in template order
    pub required_fields: &'static [&'static str],
}

impl CommandFamily {
    /// Human readable key, e.g. `compute instance terminate`
    pub fn key(&self) -> String {
        format!("{} {}", self.service, self.verb)
    }
}

macro_rules! family {
    ($service:literal, $verb:literal, $template:literal, [$($field:literal),*]) => {
        CommandFamily {
            service: $service,
            verb: $verb,
            template: $template,
            required_fields: &[$($field),*],
        }
    };
}

/// All supported families
pub static CATALOG: &[CommandFamily] = &[
    // Object Storage
    family!("os bucket", "list",
        "oci os bucket list --compartment-id <compartment_id> --namespace-name <namespace>",
        ["compartment_id", "namespace"]),
    family!("os bucket", "create",
        "oci os bucket create --compartment-id <compartment_id> --namespace-name <namespace> --name <bucket_name>",
        ["compartment_id", "namespace", "bucket_name"]),
    family!("os bucket", "delete",
        "oci os bucket delete --namespace-name <namespace> --bucket-name <bucket_name>",
        ["namespace", "bucket_name"]),
    family!("os bucket", "get",
        "oci os bucket get --namespace-name <namespace> --bucket-name <bucket_name>",
        ["namespace", "bucket_name"]),
    family!("os object", "list",
        "oci os object list --namespace-name <namespace> --bucket-name <bucket_name>",
        ["namespace", "bucket_name"]),
    family!("os ns", "get", "oci os ns get", []),
    // Compute
    family!("compute instance", "list",
        "oci compute instance list --compartment-id <compartment_id>",
        ["compartment_id"]),
    family!("compute instance", "get",
        "oci compute instance get --instance-id <instance_id>",
        ["instance_id"]),
    family!("compute instance", "launch",
        "oci compute instance launch --compartment-id <compartment_id> --availability-domain <availability_domain> --shape <shape> --subnet-id <subnet_id> --image-id <image_id>",
        ["compartment_id", "availability_domain", "shape", "subnet_id", "image_id"]),
    family!("compute instance", "terminate",
        "oci compute instance terminate --instance-id <instance_id>",
        ["instance_id"]),
    family!("compute instance", "action",
        "oci compute instance action --instance-id <instance_id> --action <action>",
        ["instance_id", "action"]),
    family!("compute instance", "update",
        "oci compute instance update --instance-id <instance_id> --display-name <display_name>",
        ["instance_id", "display_name"]),
    family!("compute image", "list",
        "oci compute image list --compartment-id <compartment_id>",
        ["compartment_id"]),
    family!("compute shape", "list",
        "oci compute shape list --compartment-id <compartment_id>",
        ["compartment_id"]),
    // Networking
    family!("network vcn", "list",
        "oci network vcn list --compartment-id <compartment_id>",
        ["compartment_id"]),
    family!("network vcn", "create",
        "oci network vcn create --compartment-id <compartment_id> --cidr-block <cidr_block>",
        ["compartment_id", "cidr_block"]),
    family!("network vcn", "delete",
        "oci network vcn delete --vcn-id <vcn_id>",
        ["vcn_id"]),
    family!("network subnet", "list",
        "oci network subnet list --compartment-id <compartment_id> --vcn-id <vcn_id>",
        ["compartment_id", "vcn_id"]),
    // Block Volume
    family!("bv volume", "list",
        "oci bv volume list --compartment-id <compartment_id>",
        ["compartment_id"]),
    family!("bv volume", "create",
        "oci bv volume create --compartment-id <compartment_id> --availability-domain <availability_domain>",
        ["compartment_id", "availability_domain"]),
    family!("bv volume", "delete",
        "oci bv volume delete --volume-id <volume_id>",
        ["volume_id"]),
    // Identity
    family!("iam compartment", "list",
        "oci iam compartment list --compartment-id <tenancy_id>",
        ["tenancy_id"]),
    family!("iam user", "list",
        "oci iam user list --compartment-id <tenancy_id>",
        ["tenancy_id"]),
    family!("iam availability-domain", "list",
        "oci iam availability-domain list --compartment-id <compartment_id>",
        ["compartment_id"]),
    family!("iam region", "list", "oci iam region list", []),
];

/// Map a verb onto the one the catalog uses for this service
///
/// Compute instances are `launch`ed and `terminate`d; everything else is
/// `create`d and `delete`d.
pub fn canonical_verb<'a>(service: &str, verb: &'a str) -> &'a str {
    let verb = match verb {
        "ls" => "list",
        "remove" | "rm" => "delete",
        "describe" | "show" => "get",
        "stop" | "start" | "reset" | "softreset" | "softstop" | "reboot" => "action",
        other => other,
    };
    if service == "compute instance" {
        match verb {
            "delete" | "destroy" => "terminate",
            "create" | "run" => "launch",
            other => other,
        }
    } else {
        match verb {
            "destroy" | "terminate" => "delete",
            other => other,
        }
    }
}

/// Find the family for a service path and verb
pub fn lookup(service: &str, verb: &str) -> Option<&'static CommandFamily> {
    let verb = canonical_verb(service, verb);
    CATALOG
        .iter()
        .find(|family| family.service == service && family.verb == verb)
}
