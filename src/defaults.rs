//! Terraform block types, resource types and attribute names shared by the
//! generators.

// Top-level block types
pub const TERRAFORM: &str = "terraform";
pub const REQUIRED_PROVIDERS: &str = "required_providers";
pub const PROVIDER: &str = "provider";
pub const RESOURCE: &str = "resource";
pub const DATA: &str = "data";
pub const OUTPUT: &str = "output";
pub const LOCALS: &str = "locals";

// Providers
pub const RANCHER2: &str = "rancher2";
pub const RANCHER2_SOURCE: &str = "rancher/rancher2";
pub const AWS: &str = "aws";
pub const AWS_SOURCE: &str = "hashicorp/aws";
pub const VSPHERE: &str = "vsphere";
pub const VSPHERE_SOURCE: &str = "hashicorp/vsphere";
pub const STANDARD_USER: &str = "standard_user";

// rancher2 resources
pub const CLUSTER: &str = "rancher2_cluster";
pub const CLUSTER_V2: &str = "rancher2_cluster_v2";
pub const CLUSTER_SYNC: &str = "rancher2_cluster_sync";
pub const CLOUD_CREDENTIAL: &str = "rancher2_cloud_credential";
pub const MACHINE_CONFIG_V2: &str = "rancher2_machine_config_v2";
pub const NODE_TEMPLATE: &str = "rancher2_node_template";
pub const NODE_POOL: &str = "rancher2_node_pool";
pub const POD_SECURITY_ADMISSION: &str = "rancher2_pod_security_admission_configuration_template";
pub const USER: &str = "rancher2_user";
pub const GLOBAL_ROLE_BINDING: &str = "rancher2_global_role_binding";
pub const CLUSTER_ROLE_TEMPLATE_BINDING: &str = "rancher2_cluster_role_template_binding";
pub const PROJECT: &str = "rancher2_project";
pub const PROJECT_ROLE_TEMPLATE_BINDING: &str = "rancher2_project_role_template_binding";

// Infrastructure resources
pub const AWS_INSTANCE: &str = "aws_instance";
pub const LOAD_BALANCER: &str = "aws_lb";
pub const INTERNAL_LOAD_BALANCER: &str = "aws_lb_internal";
pub const TARGET_GROUP: &str = "aws_lb_target_group";
pub const TARGET_GROUP_ATTACHMENT: &str = "aws_lb_target_group_attachment";
pub const LISTENER: &str = "aws_lb_listener";
pub const NULL_RESOURCE: &str = "null_resource";
pub const VSPHERE_DATACENTER: &str = "vsphere_datacenter";
pub const VSPHERE_COMPUTE_CLUSTER: &str = "vsphere_compute_cluster";
pub const VSPHERE_NETWORK: &str = "vsphere_network";
pub const VSPHERE_DATASTORE: &str = "vsphere_datastore";
pub const VSPHERE_VIRTUAL_MACHINE: &str = "vsphere_virtual_machine";
pub const VSPHERE_VIRTUAL_MACHINE_TEMPLATE: &str = "vsphere_virtual_machine_template";

// Common attributes
pub const NAME: &str = "name";
pub const DEPENDS_ON: &str = "depends_on";
pub const COUNT: &str = "count";
pub const SOURCE: &str = "source";
pub const VERSION: &str = "version";
pub const ALIAS: &str = "alias";
pub const REGION: &str = "region";
pub const ACCESS_KEY: &str = "access_key";
pub const SECRET_KEY: &str = "secret_key";
pub const KUBERNETES_VERSION: &str = "kubernetes_version";
pub const CLUSTER_ID: &str = "cluster_id";
pub const CLOUD_CREDENTIAL_ID: &str = "cloud_credential_id";
pub const DEFAULT_POD_SECURITY_ADMISSION: &str =
    "default_pod_security_admission_configuration_template_name";
pub const ENABLE_NETWORK_POLICY: &str = "enable_network_policy";
pub const RKE_CONFIG: &str = "rke_config";
pub const NETWORK: &str = "network";
pub const PLUGIN: &str = "plugin";
pub const SERVICES: &str = "services";
pub const ETCD: &str = "etcd";
pub const UPGRADE_STRATEGY: &str = "upgrade_strategy";
pub const ENGINE_INSECURE_REGISTRY: &str = "engine_insecure_registry";
pub const RKE1_PRIVATE_REGISTRIES: &str = "private_registries";
pub const REGISTRIES: &str = "registries";
pub const SECURITY_GROUPS: &str = "security_groups";
pub const SUBNETS: &str = "subnets";
pub const INLINE: &str = "inline";
pub const CONNECTION: &str = "connection";
pub const REMOTE_EXEC: &str = "remote-exec";
pub const TAGS: &str = "tags";

pub const RANCHER_BASELINE: &str = "rancher-baseline";
pub const FLEET_DEFAULT: &str = "fleet-default";
