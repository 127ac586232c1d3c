//! Client for the MOSS TTS Gradio service: synthesise speech and copy the
//! resulting audio file to a local path.

pub mod config;
pub mod reference;
pub mod synth;

pub use reference::ReferenceAudio;
pub use synth::{
    MossTts, SpeechSynthesizer, SynthesisError, SynthesisParams, SynthesisResult,
    synthesize_to_file,
};

/// Turns the optional reference argument into something the service can use.
/// An argument that is neither a URL nor an existing file is dropped with a
/// warning on stderr.
pub fn reference_from_arg(arg: Option<&str>) -> Option<ReferenceAudio> {
    let arg = arg?;
    let resolved = ReferenceAudio::resolve(arg);
    if resolved.is_none() {
        tracing::warn!(reference = arg, "Reference audio not found");
        eprintln!("WARN: reference audio not found: {arg}, proceeding without it");
    }
    resolved
}
