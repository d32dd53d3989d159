use crate::defaults::{CONNECTION, DEPENDS_ON, INLINE, NULL_RESOURCE, REMOTE_EXEC, RESOURCE};
use crate::hcl::{Body, Value};

/// Where a `remote-exec` provisioner connects to.
#[derive(Debug, Clone)]
pub struct SshTarget<'a> {
    pub host: Value,
    pub user: &'a str,
    pub private_key_path: &'a str,
    pub windows: bool,
}

impl<'a> SshTarget<'a> {
    pub fn new(host: Value, user: &'a str, private_key_path: &'a str) -> Self {
        Self {
            host,
            user,
            private_key_path,
            windows: false,
        }
    }

    pub fn windows(mut self) -> Self {
        self.windows = true;
        self
    }
}

/// Appends a `null_resource` that runs `inline` over SSH on `target` and
/// returns its body so callers can add `count` or `depends_on`.
pub fn ssh_null_resource<'a>(
    root: &'a mut Body,
    name: &str,
    target: &SshTarget<'_>,
    inline: Vec<Value>,
) -> &'a mut Body {
    let resource = root.append_block(RESOURCE, &[NULL_RESOURCE, name]);

    let provisioner = resource.append_block("provisioner", &[REMOTE_EXEC]);
    provisioner.set_attribute(INLINE, Value::List(inline));

    let connection = provisioner.append_block(CONNECTION, &[]);
    connection.set_attribute("type", "ssh");
    connection.set_attribute("host", target.host.clone());
    connection.set_attribute("user", target.user);
    connection.set_attribute(
        "private_key",
        Value::expr(format!("file(\"{}\")", target.private_key_path)),
    );
    if target.windows {
        connection.set_attribute("target_platform", "windows");
    }

    resource
}

pub fn depends_on_null_resources(resource: &mut Body, names: &[&str]) {
    resource.set_attribute(
        DEPENDS_ON,
        Value::references(names.iter().map(|n| format!("{NULL_RESOURCE}.{n}"))),
    );
}

/// The three provisioner commands that copy a script to `/tmp`, make it
/// executable and run it with `args`. Failures of the script itself do
/// not fail the apply.
pub fn script_commands(script_name: &str, content: &str, args: &[String]) -> Vec<Value> {
    let path = format!("/tmp/{script_name}");
    let mut command = format!("bash -c '{path}");
    for arg in args {
        command.push(' ');
        command.push_str(arg);
    }
    command.push_str(" || true'");

    vec![
        Value::string(format!("printf '{content}' > {path}")),
        Value::string(format!("chmod +x {path}")),
        Value::template(command),
    ]
}
