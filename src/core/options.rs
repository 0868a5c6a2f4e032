//! Decode configuration.

use std::sync::Arc;

use super::{CancelToken, Codec, CodecRegistry};

/// Engine units are centimetres; the default scale converts to metres.
pub const DEFAULT_SCALE_FACTOR: f32 = 0.01;

/// Settings shared by every decoder in one decode pass.
#[derive(Clone, Debug)]
pub struct DecodeOptions {
    /// Multiplier applied to positions (vertices, bones, sockets, actor
    /// locations, position keys). Rotations and scales are never scaled.
    pub scale_factor: f32,
    /// Decode `COLLISION` sections.
    pub import_collision: bool,
    /// Decode skeleton `SOCKETS` sections.
    pub import_sockets: bool,
    /// Decode skeleton `VIRTUALBONES` sections.
    pub import_virtual_bones: bool,
    /// Decode LOD `MORPHTARGETS` sections.
    pub import_morph_targets: bool,
    /// Codecs for compressed payloads.
    pub codecs: Arc<CodecRegistry>,
    /// Checked once per section.
    pub cancel: Option<CancelToken>,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            scale_factor: DEFAULT_SCALE_FACTOR,
            import_collision: true,
            import_sockets: true,
            import_virtual_bones: true,
            import_morph_targets: true,
            codecs: Arc::new(CodecRegistry::default()),
            cancel: None,
        }
    }
}

impl DecodeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the position scale factor.
    pub fn with_scale(mut self, scale_factor: f32) -> Self {
        self.scale_factor = scale_factor;
        self
    }

    pub fn with_collision(mut self, enabled: bool) -> Self {
        self.import_collision = enabled;
        self
    }

    pub fn with_sockets(mut self, enabled: bool) -> Self {
        self.import_sockets = enabled;
        self
    }

    pub fn with_virtual_bones(mut self, enabled: bool) -> Self {
        self.import_virtual_bones = enabled;
        self
    }

    pub fn with_morph_targets(mut self, enabled: bool) -> Self {
        self.import_morph_targets = enabled;
        self
    }

    /// Register an extra codec on top of the current registry.
    pub fn with_codec(mut self, codec: impl Codec + 'static) -> Self {
        Arc::make_mut(&mut self.codecs).register(codec);
        self
    }

    /// Replace the codec registry.
    pub fn with_codecs(mut self, codecs: CodecRegistry) -> Self {
        self.codecs = Arc::new(codecs);
        self
    }

    /// Attach a cancellation token.
    pub fn with_cancel(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// The cancellation token, if any.
    #[inline]
    pub fn cancel_token(&self) -> Option<&CancelToken> {
        self.cancel.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let opts = DecodeOptions::default();
        assert_eq!(opts.scale_factor, DEFAULT_SCALE_FACTOR);
        assert!(opts.import_collision && opts.import_sockets);
        assert!(opts.codecs.get("GZIP").is_some());
        assert!(opts.codecs.get("ZSTD").is_some());
        assert!(opts.cancel_token().is_none());
    }

    #[test]
    fn test_builder() {
        let opts = DecodeOptions::new()
            .with_scale(1.0)
            .with_collision(false)
            .with_morph_targets(false)
            .with_codecs(CodecRegistry::empty())
            .with_cancel(CancelToken::new());

        assert_eq!(opts.scale_factor, 1.0);
        assert!(!opts.import_collision);
        assert!(!opts.import_morph_targets);
        assert!(opts.import_sockets);
        assert_eq!(opts.codecs.names().count(), 0);
        assert!(opts.cancel_token().is_some());
    }

    #[test]
    fn test_with_codec_keeps_shared_registry_intact() {
        let base = DecodeOptions::default();
        let extended = base.clone().with_codec(crate::core::GzipCodec);
        assert_eq!(base.codecs.names().count(), 2);
        assert_eq!(extended.codecs.names().count(), 2);
    }
}
