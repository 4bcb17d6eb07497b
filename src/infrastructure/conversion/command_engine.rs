use async_trait::async_trait;
use tokio::process::Command;

use crate::application::ports::{ConversionEngine, ConversionError, ConversionRequest};

/// Drives an external inference CLI. The program receives the request as flags and
/// must write the converted audio to the `--output` path.
pub struct CommandConversionEngine {
    program: String,
    args: Vec<String>,
}

impl CommandConversionEngine {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    fn command(&self, request: &ConversionRequest) -> Command {
        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .arg("--input")
            .arg(&request.input_path)
            .arg("--output")
            .arg(&request.output_path)
            .arg("--model")
            .arg(&request.weights_path)
            .arg("--index")
            .arg(&request.index_path)
            .arg("--pitch")
            .arg(request.pitch_shift.to_string())
            .arg("--speaker")
            .arg(request.speaker_id.to_string())
            .arg("--f0-method")
            .arg(request.f0_method)
            .kill_on_drop(true);
        command
    }
}

#[async_trait]
impl ConversionEngine for CommandConversionEngine {
    async fn convert(&self, request: &ConversionRequest) -> Result<(), ConversionError> {
        tracing::debug!(program = %self.program, pitch = request.pitch_shift, "Invoking conversion engine");

        let output = self
            .command(request)
            .output()
            .await
            .map_err(|e| ConversionError::EngineFailed(format!("{}: {}", self.program, e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(ConversionError::EngineFailed(if stderr.is_empty() {
                format!("{} exited with {}", self.program, output.status)
            } else {
                stderr
            }));
        }

        Ok(())
    }
}
