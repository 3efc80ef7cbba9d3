//! Macros for handling CLI command execution

/// Run a service call, turning inventory errors into user-facing ones
#[macro_export]
macro_rules! execute {
	($call:expr) => {{
		$call.await.map_err($crate::util::error::CliError::from)?
	}};
}

/// Print output in the configured format (human or JSON)
#[macro_export]
macro_rules! print_output {
	($ctx:expr, $output:expr, $human:expr) => {{
		match $ctx.format {
			$crate::context::OutputFormat::Human => {
				$human($output);
			}
			$crate::context::OutputFormat::Json => {
				$crate::util::output::print_json(&$output)?;
			}
		}
	}};
}
