//! Flat in-memory retrieval: chunking, cosine ranking, and the two corpora
//! the templates search over.

mod chunking;
mod knowledge_base;
mod ranking;
mod similarity;
mod video_index;

pub use chunking::chunk_text;
pub use knowledge_base::{join_context, KnowledgeBase, CONTEXT_SEPARATOR};
pub use ranking::{rank, Ranking, Retrieval, Scored};
pub use similarity::cosine_similarity;
pub use video_index::{Video, VideoIndex};
