use std::sync::Arc;

use rmcp::{
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::*,
    tool, tool_handler, tool_router,
    transport::stdio,
    ErrorData as McpError, ServerHandler, ServiceExt,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::core::config::AdvisorConfig;
use crate::core::error::RecommendError;
use crate::knowledge::ingest::KnowledgeIngestor;
use crate::knowledge::models::CategoryVocabulary;
use crate::knowledge::store::{EmbeddingStore, InMemoryKnowledgeBase};
use crate::llm::factory::GatewayFactory;
use crate::llm::gateway::LanguageModelGateway;
use crate::recommend::{Recommendation, RecommendationPipeline};


#[derive(Debug, Deserialize, rmcp::schemars::JsonSchema)]
pub struct RecommendParams {
    #[schemars(description = "Customer message as written in the support chat")]
    pub message: String,
}

#[derive(Debug, Deserialize, rmcp::schemars::JsonSchema)]
pub struct LearnAnswerParams {
    #[schemars(description = "Reply the operator sent to the customer")]
    pub operator_reply: String,
    #[schemars(description = "Customer message the reply answered")]
    pub customer_message: String,
    #[schemars(description = "Main category to file the new entry under")]
    pub main_category: String,
}

#[derive(Debug, Serialize)]
struct RecommendationsResponse<'a> {
    recommendations: &'a [Recommendation],
}


#[derive(Clone)]
pub struct FaqAdvisorMcpServer {
    pipeline: Arc<RecommendationPipeline>,
    store: Arc<InMemoryKnowledgeBase>,
    ingestor: Arc<KnowledgeIngestor<InMemoryKnowledgeBase>>,
    config: Arc<AdvisorConfig>,
    tool_router: ToolRouter<Self>,
}

impl FaqAdvisorMcpServer {

    pub fn new(
        store: Arc<InMemoryKnowledgeBase>,
        gateway: Arc<dyn LanguageModelGateway>,
        config: AdvisorConfig,
    ) -> Self {
        let pipeline = RecommendationPipeline::new(store.clone(), gateway.clone())
            .with_trust_threshold(config.trust_threshold);
        let ingestor = KnowledgeIngestor::new(store.clone(), gateway)
            .with_concurrency(config.backfill_concurrency);

        Self {
            pipeline: Arc::new(pipeline),
            store,
            ingestor: Arc::new(ingestor),
            config: Arc::new(config),
            tool_router: Self::tool_router(),
        }
    }


    fn convert_error(err: RecommendError) -> McpError {
        match err {
            RecommendError::InvalidInput(msg) => McpError::invalid_params(msg, None),
            other => McpError::internal_error(other.to_string(), None),
        }
    }


    fn result_to_json<T: Serialize>(result: T) -> Result<String, McpError> {
        serde_json::to_string_pretty(&result)
            .map_err(|e| McpError::internal_error(e.to_string(), None))
    }


    fn recommendations_result(recommendations: &[Recommendation]) -> Result<CallToolResult, McpError> {
        let json = Self::result_to_json(RecommendationsResponse { recommendations })?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }


    async fn run_recommend(&self, message: &str, fast: bool) -> Result<Vec<Recommendation>, McpError> {
        let result = match (self.config.request_timeout(), fast) {
            (Some(limit), false) => self.pipeline.recommend_within(message, limit).await,
            (Some(limit), true) => self.pipeline.recommend_fast_within(message, limit).await,
            (None, false) => self.pipeline.recommend(message).await,
            (None, true) => self.pipeline.recommend_fast(message).await,
        };
        result.map_err(Self::convert_error)
    }
}

#[tool_router]
impl FaqAdvisorMcpServer {

    #[tool(description = "Recommend template answers for a customer message. Classifies the message, returns high-confidence embedding matches directly and otherwise asks the LLM to pick relevant answers within the category. Returns: {recommendations: [{answer, score, main_category, sub_category, target_audience, priority}]}")]
    async fn recommend(
        &self,
        Parameters(params): Parameters<RecommendParams>,
    ) -> Result<CallToolResult, McpError> {
        info!("Recommend: {}", crate::preview(&params.message, crate::LOG_PREVIEW_CHARS));

        let recommendations = self.run_recommend(&params.message, false).await?;

        Self::recommendations_result(&recommendations)
    }


    #[tool(description = "Fast recommendation by embedding similarity only (no LLM calls besides the embedding). Category fields are left empty. Returns: {recommendations: [...]}")]
    async fn recommend_fast(
        &self,
        Parameters(params): Parameters<RecommendParams>,
    ) -> Result<CallToolResult, McpError> {
        let recommendations = self.run_recommend(&params.message, true).await?;

        Self::recommendations_result(&recommendations)
    }


    #[tool(description = "Classify a customer message into the knowledge base's main category and target audience. Returns: {main_category, target_audience} (null when nothing fits)")]
    async fn classify_message(
        &self,
        Parameters(params): Parameters<RecommendParams>,
    ) -> Result<CallToolResult, McpError> {
        let entries = self.store.entries().await.map_err(Self::convert_error)?;
        let vocabulary = CategoryVocabulary::from_entries(&entries);

        let classification = self
            .pipeline
            .classifier()
            .classify_entities(&vocabulary, &params.message)
            .await
            .map_err(Self::convert_error)?;

        let json = Self::result_to_json(&classification)?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }


    #[tool(description = "Store an operator reply as a new FAQ entry unless the knowledge base already covers it. Returns: {added: bool}")]
    async fn learn_answer(
        &self,
        Parameters(params): Parameters<LearnAnswerParams>,
    ) -> Result<CallToolResult, McpError> {
        let added = self
            .ingestor
            .learn_from_dialogue(&params.operator_reply, &params.customer_message, &params.main_category)
            .await
            .map_err(Self::convert_error)?;

        if added {
            if let Some(path) = &self.config.knowledge_base_path {
                self.store.save_json(path).await.map_err(Self::convert_error)?;
            }
        }

        let json = Self::result_to_json(serde_json::json!({ "added": added }))?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }
}


#[tool_handler]
impl ServerHandler for FaqAdvisorMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "faq-advisor".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Default::default()
            },
            instructions: Some(
                "Bank support FAQ advisor. Use recommend for ranked template answers to a \
                 customer message, recommend_fast for embedding-only matches, classify_message \
                 to route a message, and learn_answer to store a new operator reply."
                    .to_string(),
            ),
        }
    }
}


pub async fn run_server() -> anyhow::Result<()> {
    info!("Initializing FAQ advisor MCP server...");

    let config = AdvisorConfig::load()?;
    let store = Arc::new(match &config.knowledge_base_path {
        Some(path) => InMemoryKnowledgeBase::load_json(path).await?,
        None => {
            warn!("No knowledge_base_path configured, starting with an empty knowledge base");
            InMemoryKnowledgeBase::default()
        }
    });
    let gateway: Arc<dyn LanguageModelGateway> = Arc::new(GatewayFactory::from_config(&config)?);

    let server = FaqAdvisorMcpServer::new(store.clone(), gateway, config.clone());

    if config.backfill_on_start {
        let report = server.ingestor.backfill_embeddings().await?;
        if report.embedded > 0 {
            if let Some(path) = &config.knowledge_base_path {
                store.save_json(path).await?;
            }
        }
    }

    info!("FAQ advisor ready: {} entries", store.len());
    info!("   LLM: {} @ {}", config.llm_model, config.llm_base_url);
    info!("   Embeddings: {} @ {}", config.embedding_model, config.embedding_base_url);
    info!("   Trust threshold: {}", config.trust_threshold);

    let service = server.serve(stdio()).await?;
    service.waiting().await?;

    Ok(())
}
