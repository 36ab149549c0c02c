use crate::cli::args::CliArgs;

pub fn validate(args: &CliArgs) -> Result<(), String> {
    if let Some(raw) = args.listen.as_deref() {
        crate::utils::parse_listen_addr(raw).map_err(|e| format!("invalid --listen '{raw}': {e}"))?;
    }
    if let Some(raw) = args.rpc_address.as_deref() {
        crate::utils::parse_http_url(raw)
            .map_err(|e| format!("invalid --rpc-address '{raw}': {e}"))?;
    }
    if let Some(raw) = args.mount_header.as_deref() {
        crate::utils::parse_header_name(raw)
            .map_err(|e| format!("invalid --mount-header '{raw}': {e}"))?;
    }
    if let Some(raw) = args.base_path.as_deref() {
        crate::utils::parse_base_path(raw)
            .map_err(|e| format!("invalid --base-path '{raw}': {e}"))?;
    }
    if let Some(timeout) = args.rpc_timeout {
        if timeout == 0 {
            return Err("invalid rpc-timeout, expected positive integer".to_string());
        }
    }
    if let Some(workers) = args.workers {
        if workers == 0 {
            return Err("invalid workers, expected positive integer".to_string());
        }
    }
    if let Some(layout) = args.layout.as_deref() {
        if layout.trim().is_empty() || layout.contains(&['/', '\\'][..]) {
            return Err("invalid layout, expected a template name".to_string());
        }
    }
    Ok(())
}
