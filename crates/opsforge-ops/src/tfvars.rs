//! Terraform variable-file rendering.
//!
//! The key set and text format (including the leading blank line) are part
//! of the external contract with the provisioning back-end and must not
//! change: `image`, `app_name`, `namespace`, `replicas`, `service_type`.

use crate::config::OpsConfig;

/// Render the contents of the generated `auto.tfvars` file.
pub fn render(config: &OpsConfig, image_tag: &str, replicas: i64, service_type: &str) -> String {
    format!(
        "\nimage = \"{image}\"\napp_name = \"{app_name}\"\nnamespace = \"{namespace}\"\nreplicas = {replicas}\nservice_type = \"{service_type}\"\n",
        image = config.image_reference(image_tag),
        app_name = config.app_name,
        namespace = config.namespace,
    )
}
