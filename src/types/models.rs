//! Model identifiers
//!
//! Closed enumerations of the model names this crate knows about. Requests
//! take the model as a plain string, so newer models can be used without a
//! release; these enums exist for discoverability and typo safety.
//!
//! See <https://docs.mistral.ai/getting-started/models/>.

use std::fmt;
use std::str::FromStr;

use crate::error::LlmError;

macro_rules! model_enum {
    (
        $(#[$meta:meta])*
        $name:ident { $($(#[$vmeta:meta])* $variant:ident => $wire:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($(#[$vmeta])* $variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Wire identifier sent in the `model` field.
            pub const fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $wire),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = LlmError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($wire => Ok($name::$variant),)+
                    other => Err(LlmError::validation(format!(
                        concat!("unknown ", stringify!($name), ": {}"),
                        other
                    ))),
                }
            }
        }

        impl From<$name> for String {
            fn from(model: $name) -> String {
                model.as_str().to_string()
            }
        }
    };
}

model_enum! {
    /// Code generation models usable with fill-in-the-middle completion.
    CodeModel {
        CodestralLatest => "codestral-latest",
        OpenCodestralMamba => "open-codestral-mamba",
    }
}

model_enum! {
    /// Chat completion models.
    ChatModelName {
        OpenMistral7b => "open-mistral-7b",
        OpenMixtral8x7b => "open-mixtral-8x7b",
        OpenMixtral8x22b => "open-mixtral-8x22b",
        MistralSmallLatest => "mistral-small-latest",
        MistralMediumLatest => "mistral-medium-latest",
        MistralLargeLatest => "mistral-large-latest",
    }
}

model_enum! {
    /// Embedding models.
    EmbeddingModelName {
        MistralEmbed => "mistral-embed",
    }
}

impl Default for CodeModel {
    fn default() -> Self {
        Self::CodestralLatest
    }
}

impl Default for ChatModelName {
    fn default() -> Self {
        Self::OpenMistral7b
    }
}

impl Default for EmbeddingModelName {
    fn default() -> Self {
        Self::MistralEmbed
    }
}
