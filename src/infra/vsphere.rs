use crate::config::{ConfigError, TerraformConfig, VsphereConfig};
use crate::defaults::{
    COUNT, DATA, NAME, PROVIDER, RESOURCE, SOURCE, VERSION, VSPHERE, VSPHERE_COMPUTE_CLUSTER,
    VSPHERE_DATACENTER, VSPHERE_DATASTORE, VSPHERE_NETWORK, VSPHERE_SOURCE,
    VSPHERE_VIRTUAL_MACHINE, VSPHERE_VIRTUAL_MACHINE_TEMPLATE,
};
use crate::hcl::{Body, Value};

const DATACENTER_ID: &str = "datacenter_id";

pub fn set_required_provider(required_providers: &mut Body) {
    required_providers.set_attribute(
        VSPHERE,
        Value::object([(SOURCE, Value::string(VSPHERE_SOURCE))]),
    );
}

pub fn set_provider_block(root: &mut Body, config: &TerraformConfig) -> Result<(), ConfigError> {
    let credentials = config.vsphere_credentials()?;

    let provider = root.append_block(PROVIDER, &[VSPHERE]);
    provider.set_attribute("user", &credentials.username);
    provider.set_attribute("password", &credentials.password);
    provider.set_attribute("vsphere_server", &credentials.vcenter);
    provider.set_attribute("allow_unverified_ssl", true);

    Ok(())
}

fn data_id(data_type: &str) -> Value {
    Value::traversal(&[DATA, data_type, data_type, "id"])
}

/// Looks up the datacenter, compute cluster, network, datastore and clone
/// template the virtual machines are placed on.
pub fn create_data_sources(root: &mut Body, vsphere: &VsphereConfig) {
    let datacenter = root.append_block(DATA, &[VSPHERE_DATACENTER, VSPHERE_DATACENTER]);
    datacenter.set_attribute(NAME, &vsphere.datacenter);
    root.append_newline();

    let lookups = [
        (VSPHERE_COMPUTE_CLUSTER, VSPHERE_COMPUTE_CLUSTER, &vsphere.compute_cluster),
        (VSPHERE_NETWORK, VSPHERE_NETWORK, &vsphere.standalone_network),
        (VSPHERE_DATASTORE, VSPHERE_DATASTORE, &vsphere.datastore),
        (
            VSPHERE_VIRTUAL_MACHINE,
            VSPHERE_VIRTUAL_MACHINE_TEMPLATE,
            &vsphere.vm_template,
        ),
    ];

    for (data_type, label, name) in lookups {
        let block = root.append_block(DATA, &[data_type, label]);
        block.set_attribute(NAME, name);
        block.set_attribute(DATACENTER_ID, data_id(VSPHERE_DATACENTER));
        root.append_newline();
    }
}

fn parse_number(field: &str, value: &str) -> Result<i64, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::Invalid(format!("vsphereConfig.{field} must be a number, got {value:?}")))
}

/// Appends `resource "vsphere_virtual_machine" "<name>"` cloned from the
/// template looked up by [`create_data_sources`].
pub fn create_virtual_machine<'a>(
    root: &'a mut Body,
    vsphere: &VsphereConfig,
    name: &str,
    count: Option<i64>,
) -> Result<&'a mut Body, ConfigError> {
    let cpus = parse_number("cpuCount", &vsphere.cpu_count)?;
    let memory = parse_number("memorySize", &vsphere.memory_size)?;
    let disk_mb = parse_number("diskSize", &vsphere.disk_size)?;

    let vm = root.append_block(RESOURCE, &[VSPHERE_VIRTUAL_MACHINE, name]);
    if let Some(count) = count {
        vm.set_attribute(COUNT, count);
        vm.set_attribute(NAME, Value::template(format!("{name}-${{count.index}}")));
    } else {
        vm.set_attribute(NAME, name);
    }

    vm.set_attribute(
        "resource_pool_id",
        Value::traversal(&[
            DATA,
            VSPHERE_COMPUTE_CLUSTER,
            VSPHERE_COMPUTE_CLUSTER,
            "resource_pool_id",
        ]),
    );
    vm.set_attribute("datastore_id", data_id(VSPHERE_DATASTORE));
    if !vsphere.folder.is_empty() {
        vm.set_attribute("folder", &vsphere.folder);
    }
    vm.set_attribute("num_cpus", cpus);
    vm.set_attribute("memory", memory);
    if !vsphere.guest_id.is_empty() {
        vm.set_attribute("guest_id", &vsphere.guest_id);
    }

    vm.append_block("network_interface", &[])
        .set_attribute("network_id", data_id(VSPHERE_NETWORK));

    let disk = vm.append_block("disk", &[]);
    disk.set_attribute("label", "disk0");
    disk.set_attribute("size", (disk_mb / 1024).max(1));

    vm.append_block("clone", &[]).set_attribute(
        "template_uuid",
        Value::traversal(&[
            DATA,
            VSPHERE_VIRTUAL_MACHINE,
            VSPHERE_VIRTUAL_MACHINE_TEMPLATE,
            "id",
        ]),
    );

    Ok(vm)
}

/// `${vsphere_virtual_machine.<name>.default_ip_address}`, indexed by
/// `count.index` when counted.
pub fn ip_address(name: &str, counted: bool) -> String {
    if counted {
        format!("${{{VSPHERE_VIRTUAL_MACHINE}.{name}[count.index].default_ip_address}}")
    } else {
        format!("${{{VSPHERE_VIRTUAL_MACHINE}.{name}.default_ip_address}}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::test_support::all_providers_config;

    #[test]
    fn test_data_sources_reference_datacenter() {
        let configs = all_providers_config();
        let vsphere = configs.terraform.vsphere_config().unwrap();
        let mut root = Body::default();
        create_data_sources(&mut root, vsphere);

        let network = root
            .find_block(DATA, &[VSPHERE_NETWORK, VSPHERE_NETWORK])
            .unwrap()
            .body();
        assert_eq!(
            network.attribute(DATACENTER_ID),
            Some(&Value::expr("data.vsphere_datacenter.vsphere_datacenter.id"))
        );
        assert!(
            root.find_block(
                DATA,
                &[VSPHERE_VIRTUAL_MACHINE, VSPHERE_VIRTUAL_MACHINE_TEMPLATE]
            )
            .is_some()
        );
    }

    #[test]
    fn test_virtual_machine_sizes() {
        let configs = all_providers_config();
        let vsphere = configs.terraform.vsphere_config().unwrap();
        let mut root = Body::default();
        create_virtual_machine(&mut root, vsphere, "tfp_pool0", Some(2)).unwrap();

        let vm = root
            .find_block(RESOURCE, &[VSPHERE_VIRTUAL_MACHINE, "tfp_pool0"])
            .unwrap()
            .body();
        assert_eq!(vm.attribute("num_cpus"), Some(&Value::Number(4)));
        assert_eq!(vm.attribute("memory"), Some(&Value::Number(8192)));
        assert_eq!(vm.attribute(COUNT), Some(&Value::Number(2)));
        let disk = vm.find_block("disk", &[]).unwrap().body();
        assert_eq!(disk.attribute("size"), Some(&Value::Number(39)));
    }

    #[test]
    fn test_virtual_machine_rejects_non_numeric_cpu() {
        let mut configs = all_providers_config();
        configs.terraform.vsphere_config.as_mut().unwrap().cpu_count = "four".to_string();
        let vsphere = configs.terraform.vsphere_config().unwrap();
        let mut root = Body::default();

        let err = create_virtual_machine(&mut root, vsphere, "tfp", None).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(msg) if msg.contains("cpuCount")));
    }
}
