use super::{NodeProvider, ProviderError};
use crate::config::TerraformConfig;
use crate::defaults::{ACCESS_KEY, REGION, SECRET_KEY};
use crate::hcl::{Body, list_of_strings};

pub const EC2_CONFIG: &str = "amazonec2_config";
pub const EC2_CREDENTIAL_CONFIG: &str = "amazonec2_credential_config";

pub const AMI: &str = "ami";
pub const INSTANCE_TYPE: &str = "instance_type";
pub const ROOT_SIZE: &str = "root_size";
pub const SECURITY_GROUP: &str = "security_group";
pub const SSH_USER: &str = "ssh_user";
pub const SUBNET_ID: &str = "subnet_id";
pub const VOLUME_TYPE: &str = "volume_type";
pub const VPC_ID: &str = "vpc_id";
pub const ZONE: &str = "zone";

pub struct AwsProvider;

impl NodeProvider for AwsProvider {
    fn name(&self) -> &str {
        "aws"
    }

    fn set_credential_config(
        &self,
        body: &mut Body,
        config: &TerraformConfig,
    ) -> Result<(), ProviderError> {
        let credentials = config.aws_credentials()?;

        let cred = body.append_block(EC2_CREDENTIAL_CONFIG, &[]);
        cred.set_attribute(ACCESS_KEY, &credentials.aws_access_key);
        cred.set_attribute(SECRET_KEY, &credentials.aws_secret_key);

        Ok(())
    }

    fn set_node_template(
        &self,
        body: &mut Body,
        config: &TerraformConfig,
    ) -> Result<(), ProviderError> {
        let credentials = config.aws_credentials()?;
        let aws = config.aws_config()?;

        let ec2 = body.append_block(EC2_CONFIG, &[]);
        ec2.set_attribute(ACCESS_KEY, &credentials.aws_access_key);
        ec2.set_attribute(SECRET_KEY, &credentials.aws_secret_key);
        ec2.set_attribute(REGION, &aws.region);

        ec2.set_attribute(AMI, &aws.ami);
        ec2.set_attribute(INSTANCE_TYPE, &aws.aws_instance_type);
        ec2.set_attribute(SSH_USER, &aws.aws_user);
        ec2.set_attribute(VOLUME_TYPE, &aws.aws_volume_type);
        ec2.set_attribute(ROOT_SIZE, aws.aws_root_size);
        ec2.set_attribute(SECURITY_GROUP, list_of_strings(&aws.aws_security_group_names));
        ec2.set_attribute(SUBNET_ID, &aws.aws_subnet_id);
        ec2.set_attribute(VPC_ID, &aws.aws_vpc_id);
        ec2.set_attribute(ZONE, &aws.aws_zone_letter);

        Ok(())
    }

    fn set_machine_config(
        &self,
        body: &mut Body,
        config: &TerraformConfig,
    ) -> Result<(), ProviderError> {
        let aws = config.aws_config()?;

        let ec2 = body.append_block(EC2_CONFIG, &[]);
        ec2.set_attribute(AMI, &aws.ami);
        ec2.set_attribute(REGION, &aws.region);
        ec2.set_attribute(SECURITY_GROUP, list_of_strings(&aws.aws_security_group_names));
        ec2.set_attribute(SUBNET_ID, &aws.aws_subnet_id);
        ec2.set_attribute(VPC_ID, &aws.aws_vpc_id);
        ec2.set_attribute(ZONE, &aws.aws_zone_letter);
        ec2.set_attribute(ROOT_SIZE, aws.aws_root_size);
        ec2.set_attribute(INSTANCE_TYPE, &aws.aws_instance_type);
        super::set_non_empty(ec2, SSH_USER, &aws.aws_user);

        Ok(())
    }
}
