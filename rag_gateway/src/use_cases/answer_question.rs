use std::sync::Arc;

use common::helper::error_chain_fmt;
use serde::Serialize;
use tracing::info;

use crate::domain::entities::source_descriptor::SourceDescriptor;
use crate::domain::services::node_retriever::FixedNodeRetriever;
use crate::domain::services::query_engine::{assemble_context, build_qa_prompt};
use crate::ports::completion_port::{CompletionPort, CompletionPortError};
use crate::ports::point_search_port::{PointSearchPort, PointSearchPortError};
use crate::ports::query_encoder_port::{QueryEncoderPort, QueryEncoderPortError};

/// One question against one collection.
#[derive(Debug, Clone)]
pub struct AnswerQuestionRequest {
    pub question: String,
    pub collection_name: String,
    pub nb_results: u64,
}

/// The synthesized answer with the sources backing it.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AnsweredQuestion {
    pub answer: String,
    pub sources: Vec<SourceDescriptor>,
}

/// Encodes the question, retrieves the nearest content nodes from the vector
/// store and delegates the answer synthesis to the language model.
pub struct AnswerQuestionUseCase {
    query_encoder: Arc<dyn QueryEncoderPort>,
    point_search: Arc<dyn PointSearchPort>,
    completion: Arc<dyn CompletionPort>,
}

impl AnswerQuestionUseCase {
    pub fn new(
        query_encoder: Arc<dyn QueryEncoderPort>,
        point_search: Arc<dyn PointSearchPort>,
        completion: Arc<dyn CompletionPort>,
    ) -> Self {
        Self {
            query_encoder,
            point_search,
            completion,
        }
    }

    #[tracing::instrument(
        name = "Answering question",
        skip(self, request),
        fields(
            collection_name = %request.collection_name,
            nb_results = request.nb_results,
        )
    )]
    pub async fn execute(
        &self,
        request: AnswerQuestionRequest,
    ) -> Result<AnsweredQuestion, AnswerQuestionError> {
        let query_vector = self.query_encoder.encode(&request.question).await?;

        let ids = self
            .point_search
            .search_nearest(&request.collection_name, query_vector, request.nb_results)
            .await?;
        if ids.is_empty() {
            info!("No matching point, answering with an empty response");
            return Ok(AnsweredQuestion {
                answer: String::new(),
                sources: vec![],
            });
        }

        let nodes = self
            .point_search
            .get_nodes(&request.collection_name, &ids)
            .await?;
        let scored_nodes = FixedNodeRetriever::new(nodes).retrieve();

        let sources = scored_nodes
            .iter()
            .map(|scored| SourceDescriptor::from_node(&scored.node))
            .collect();

        let context = assemble_context(&scored_nodes);
        let prompt = build_qa_prompt(&context, &request.question);
        let answer = self.completion.complete(&prompt).await?;

        Ok(AnsweredQuestion { answer, sources })
    }
}

#[derive(thiserror::Error)]
pub enum AnswerQuestionError {
    #[error(transparent)]
    QueryEncoderError(#[from] QueryEncoderPortError),
    #[error(transparent)]
    PointSearchError(#[from] PointSearchPortError),
    #[error(transparent)]
    CompletionError(#[from] CompletionPortError),
}

impl std::fmt::Debug for AnswerQuestionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}
