use protodex::{
    chunking::GeminiChunker, config, logging, pipeline::PipelineRunner,
    storage::GcsDocumentSource, vectorstore::FirestoreVectorStore,
};

#[tokio::main]
async fn main() {
    config::init_config();
    logging::init_tracing();
    tracing::info!("Starting protocol vector ingestion");

    let source = GcsDocumentSource::from_config().expect("Failed to build storage client");
    let chunker = GeminiChunker::from_config().expect("Failed to build chunking client");
    let store = FirestoreVectorStore::from_config().expect("Failed to build vector store client");
    let prefix = config::get_config().folder_prefix.clone();
    let runner = PipelineRunner::new(
        Box::new(source),
        Box::new(chunker),
        Box::new(store),
        prefix,
    );

    match runner.process_all().await {
        Ok(results) => {
            for result in &results {
                tracing::info!(
                    file = %result.file_name,
                    chunks = result.total_chunks(),
                    "Document indexed"
                );
            }
            tracing::info!(documents = results.len(), "Ingestion complete");
        }
        Err(err) => {
            tracing::error!(error = %err, "Ingestion failed");
            std::process::exit(1);
        }
    }
}
