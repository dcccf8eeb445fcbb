#[macro_use]
extern crate lazy_static;
#[macro_use]
extern crate log;

mod core;

pub use crate::core::config::{Arc, Configuration};
pub use crate::core::conllx;
pub use crate::core::error::{
    ConfigError, ConllxError, FeatureTemplateSyntaxError, ModelLoadError, NoLegalTransition,
    ParseError, PreconditionViolation,
};
pub use crate::core::feature::{
    parse_template_file, AddressTemplate, AggregateGenerator, FeatureGenerator, HashSink, ABSENT,
};
pub use crate::core::guide::{parse, HashingGuide, InMemoryModel, Model};
pub use crate::core::sentence::{Sentence, Token, ROOT};
pub use crate::core::transition::{
    arc_eager::ArcEager, arc_standard::ArcStandard, label::LabelNumberer,
    stack_projective::StackProjective, Transition, TransitionSystem,
};
pub use crate::core::util::{encoder::Encoder, thread_pool::ThreadPool};

pub mod cli;
