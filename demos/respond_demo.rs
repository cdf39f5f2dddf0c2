//! Demo: run turns through the response orchestrator from the command line.
//!
//! ```text
//! cargo run --example respond_demo -- "你好，今日天氣很好"
//! cargo run --example respond_demo -- "（"     # enable voice output
//! cargo run --example respond_demo -- "）"     # disable voice output
//! ```
//!
//! With `VOX_TTS_API_KEY` set, synthesis goes to the OpenAI-compatible
//! endpoint; otherwise the placeholder backend is used and no audio is
//! produced.

use std::sync::Arc;
use voxbridge::{
    HttpSynthesizer, PlaceholderSynthesizer, ResponseOrchestrator, Synthesizer, VoiceConfig,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let text = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "你好，今日天氣很好，適合去行山。".to_string());

    let synthesizer: Arc<dyn Synthesizer> = match HttpSynthesizer::from_env() {
        Ok(tts) => Arc::new(tts),
        Err(_) => {
            tracing::info!("VOX_TTS_API_KEY not set; using placeholder synthesizer");
            Arc::new(PlaceholderSynthesizer)
        }
    };

    let orch = ResponseOrchestrator::new(
        VoiceConfig::from_env(),
        "voice_output_state.json",
        synthesizer,
    );

    println!("{}", orch.voice_status());
    let result = orch.respond(&text).await?;

    println!("display : {}", result.display_text);
    if let Some(spoken) = &result.audio_text {
        println!("spoken  : {spoken}{}", if result.truncated { " (truncated)" } else { "" });
    }
    match &result.audio {
        Some(artifact) => println!("audio   : {} bytes ({})", artifact.bytes.len(), artifact.format),
        None if result.timed_out => println!("audio   : none (synthesis timed out)"),
        None => println!("audio   : none"),
    }
    println!("action  : {:?}", result.action);

    Ok(())
}
