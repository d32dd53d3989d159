use crate::config::Role;
use crate::defaults::{
    CLUSTER_ID, CLUSTER_ROLE_TEMPLATE_BINDING, DEPENDS_ON, GLOBAL_ROLE_BINDING, NAME, PROJECT,
    PROJECT_ROLE_TEMPLATE_BINDING, RESOURCE, USER,
};
use crate::hcl::{Body, Value};

use super::GenerateContext;

const ROLE_TEMPLATE_ID: &str = "role_template_id";
const USER_ID: &str = "user_id";

/// The cluster resource the bindings attach to.
pub(super) struct ClusterRef {
    /// e.g. `rancher2_cluster.tfp-abcde`
    pub resource: String,
    /// Expression yielding the v3 cluster ID.
    pub id: Value,
}

/// Creates the test user with a global `user` binding, then binds `role`
/// on the cluster or on a fresh project in it.
pub(super) fn set_rbac(root: &mut Body, ctx: &GenerateContext<'_>, role: &Role, cluster: &ClusterRef) {
    let username = ctx.credentials.username.as_str();

    let user = root.append_block(RESOURCE, &[USER, username]);
    user.set_attribute(NAME, username);
    user.set_attribute("username", username);
    user.set_attribute("password", &ctx.credentials.password);
    user.set_attribute("enabled", true);
    root.append_newline();

    let user_id = Value::traversal(&[USER, username, "id"]);

    let global = root.append_block(RESOURCE, &[GLOBAL_ROLE_BINDING, username]);
    global.set_attribute(NAME, username);
    global.set_attribute("global_role_id", "user");
    global.set_attribute(USER_ID, user_id.clone());
    root.append_newline();

    let depends_on = Value::references([cluster.resource.clone()]);

    if role.is_project_scoped() {
        let project = root.append_block(RESOURCE, &[PROJECT, username]);
        project.set_attribute(NAME, format!("{username}-project"));
        project.set_attribute(CLUSTER_ID, cluster.id.clone());
        project.set_attribute(DEPENDS_ON, depends_on.clone());
        root.append_newline();

        let binding = root.append_block(RESOURCE, &[PROJECT_ROLE_TEMPLATE_BINDING, username]);
        binding.set_attribute(NAME, format!("{username}-{role}"));
        binding.set_attribute("project_id", Value::traversal(&[PROJECT, username, "id"]));
        binding.set_attribute(ROLE_TEMPLATE_ID, role.as_str());
        binding.set_attribute(USER_ID, user_id);
        binding.set_attribute(DEPENDS_ON, depends_on);
    } else {
        let binding = root.append_block(RESOURCE, &[CLUSTER_ROLE_TEMPLATE_BINDING, username]);
        binding.set_attribute(NAME, format!("{username}-{role}"));
        binding.set_attribute(CLUSTER_ID, cluster.id.clone());
        binding.set_attribute(ROLE_TEMPLATE_ID, role.as_str());
        binding.set_attribute(USER_ID, user_id);
        binding.set_attribute(DEPENDS_ON, depends_on);
    }
    root.append_newline();

    tracing::debug!(user = %username, role = %role, "added RBAC binding");
}
