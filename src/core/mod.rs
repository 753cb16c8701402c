pub mod context;
pub mod corpus;
pub mod lexicon;
pub mod phrase;
pub mod pipeline;
pub mod roles;
pub mod sentence;
pub mod variety;
pub mod vocabulary;
