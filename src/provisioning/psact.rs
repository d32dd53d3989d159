use crate::defaults::{NAME, POD_SECURITY_ADMISSION, RANCHER_BASELINE, RESOURCE};
use crate::hcl::{Body, Value};

const BASELINE: &str = "baseline";
const LATEST: &str = "latest";

const BASELINE_DESCRIPTION: &str = "This is a custom baseline Pod Security Admission \
Configuration Template. It defines a minimally restrictive policy which prevents known \
privilege escalations. This policy contains namespace level exemptions for Rancher components.";

const EXEMPT_NAMESPACES: [&str; 20] = [
    "ingress-nginx",
    "kube-system",
    "cattle-system",
    "cattle-epinio-system",
    "cattle-fleet-system",
    "longhorn-system",
    "cattle-neuvector-system",
    "cattle-monitoring-system",
    "rancher-alerting-drivers",
    "cis-operator-system",
    "cattle-csp-adapter-system",
    "cattle-externalip-system",
    "cattle-gatekeeper-system",
    "istio-system",
    "cattle-istio-system",
    "cattle-logging-system",
    "cattle-windows-gmsa-system",
    "cattle-sriov-system",
    "cattle-ui-plugin-system",
    "tigera-operator",
];

/// Whether `psact` asks for the generated baseline template rather than a
/// built-in one.
pub(super) fn is_baseline(psact: &str) -> bool {
    psact == RANCHER_BASELINE
}

/// Writes the `rancher-baseline` template and returns the reference
/// clusters depend on.
pub(super) fn set_baseline_psact(root: &mut Body, label: &str) -> String {
    let template = root.append_block(RESOURCE, &[POD_SECURITY_ADMISSION, label]);
    template.set_attribute(NAME, RANCHER_BASELINE);
    template.set_attribute("description", BASELINE_DESCRIPTION);

    let defaults = template.append_block("defaults", &[]);
    defaults.set_attribute("audit", BASELINE);
    defaults.set_attribute("audit_version", LATEST);
    defaults.set_attribute("enforce", BASELINE);
    defaults.set_attribute("enforce_version", LATEST);
    defaults.set_attribute("warn", BASELINE);
    defaults.set_attribute("warn_version", LATEST);

    template
        .append_block("exemptions", &[])
        .set_attribute("namespaces", Value::strings(EXEMPT_NAMESPACES));

    root.append_newline();
    format!("{POD_SECURITY_ADMISSION}.{label}")
}
