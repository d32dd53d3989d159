use crate::config::{AwsConfig, ConfigError, TerraformConfig};
use crate::defaults::{
    ACCESS_KEY, AWS, AWS_INSTANCE, AWS_SOURCE, COUNT, PROVIDER, REGION, RESOURCE, SECRET_KEY,
    SOURCE, TAGS, VERSION,
};
use crate::hcl::{Body, Value, list_of_strings};

const AMI: &str = "ami";
const INSTANCE_TYPE: &str = "instance_type";
const SUBNET_ID: &str = "subnet_id";
const SECURITY_GROUP_IDS: &str = "vpc_security_group_ids";
const KEY_NAME: &str = "key_name";
const ASSOCIATE_PUBLIC_IP: &str = "associate_public_ip_address";
const ROOT_BLOCK_DEVICE: &str = "root_block_device";
const VOLUME_SIZE: &str = "volume_size";
const VOLUME_TYPE: &str = "volume_type";

/// Which image and size an instance uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstanceOs {
    Linux,
    Windows,
}

/// `aws = { source = "hashicorp/aws", version = "..." }` inside
/// `required_providers`. The version is omitted when unpinned.
pub fn set_required_provider(required_providers: &mut Body, version: Option<String>) {
    let mut entries = vec![(SOURCE, Value::string(AWS_SOURCE))];
    if let Some(version) = version {
        entries.push((VERSION, Value::string(version)));
    }
    required_providers.set_attribute(AWS, Value::object(entries));
}

pub fn set_provider_block(root: &mut Body, config: &TerraformConfig) -> Result<(), ConfigError> {
    let credentials = config.aws_credentials()?;
    let aws = config.aws_config()?;

    let provider = root.append_block(PROVIDER, &[AWS]);
    provider.set_attribute(REGION, &aws.region);
    provider.set_attribute(ACCESS_KEY, &credentials.aws_access_key);
    provider.set_attribute(SECRET_KEY, &credentials.aws_secret_key);

    Ok(())
}

/// Appends `resource "aws_instance" "<name>"`. A `count` above one turns the
/// resource into a list addressed with `[count.index]`.
pub fn create_instance<'a>(
    root: &'a mut Body,
    aws: &AwsConfig,
    name: &str,
    count: Option<i64>,
    os: InstanceOs,
    tag: &str,
) -> &'a mut Body {
    let instance = root.append_block(RESOURCE, &[AWS_INSTANCE, name]);
    if let Some(count) = count {
        instance.set_attribute(COUNT, count);
    }

    let (ami, instance_type) = match os {
        InstanceOs::Linux => (&aws.ami, &aws.aws_instance_type),
        InstanceOs::Windows => (&aws.windows_ami, &aws.windows_instance_type),
    };

    instance.set_attribute(AMI, ami);
    instance.set_attribute(INSTANCE_TYPE, instance_type);
    instance.set_attribute(ASSOCIATE_PUBLIC_IP, true);
    instance.set_attribute(SUBNET_ID, &aws.aws_subnet_id);
    instance.set_attribute(SECURITY_GROUP_IDS, list_of_strings(&aws.aws_security_groups));
    instance.set_attribute(KEY_NAME, &aws.aws_key_name);

    let root_device = instance.append_block(ROOT_BLOCK_DEVICE, &[]);
    root_device.set_attribute(VOLUME_SIZE, aws.aws_root_size);
    root_device.set_attribute(VOLUME_TYPE, &aws.aws_volume_type);

    instance.set_attribute(TAGS, Value::object([("Name", Value::string(tag))]));
    instance
}

/// `${aws_instance.<name>.<attr>}`, or `[count.index]` addressed when the
/// instance has a count.
pub fn instance_attribute(name: &str, attribute: &str, counted: bool) -> String {
    if counted {
        format!("${{{AWS_INSTANCE}.{name}[count.index].{attribute}}}")
    } else {
        format!("${{{AWS_INSTANCE}.{name}.{attribute}}}")
    }
}
