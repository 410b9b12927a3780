use anyhow::{Context, Result};
use clap::Parser;
use interview_session::gate::{self, View};
use interview_session::speech::SpeechOutput;
use interview_session::types::InterviewId;
use interview_session::{Config, InterviewSession, SessionUpdate};
use interview_session_utils::StatusClient;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::time::ChronoLocal;

/// Speaks by printing.
struct Console;

impl SpeechOutput for Console {
    fn speak(&mut self, text: &str) {
        println!("interviewer> {text}");
    }

    fn cancel(&mut self) {}

    fn is_speaking(&self) -> bool {
        false
    }
}

#[derive(Parser)]
struct Cli {
    /// Interview to join. A new one is created when omitted.
    interview_id: Option<String>,
    /// Join without checking the interview status first
    #[arg(long)]
    skip_gate: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env().context("Failed to load configuration")?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_timer(ChronoLocal::rfc_3339())
        .init();

    let args = Cli::parse();
    let client = StatusClient::new(config.api_url());

    let Some(raw_id) = args.interview_id else {
        let record = client
            .create()
            .await
            .context("Failed to create an interview")?
            .context("Backend returned no interview")?;
        println!("Upload a resume at {}", View::ResumeUpload.path(record.id()));
        return Ok(());
    };
    let interview_id = InterviewId::parse(&raw_id).context("Interview id is blank")?;

    if !args.skip_gate {
        if let Err(e) = gate::authorize(&client, View::Chat, &interview_id).await {
            tracing::error!("cannot join interview: {}", e);
            println!("Redirecting to {}", View::fallback_path());
            return Ok(());
        }
    }

    let session = InterviewSession::builder(config)
        .with_interview_id(Some(interview_id))
        .with_speech_output(Box::new(Console))
        .build();
    let handle = session.handle();
    let mut updates = session.updates();

    println!("Type an answer and press enter. /end finishes the interview, /quit leaves.");

    let input = tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            let sent = match line.trim() {
                "/quit" => {
                    let _ = handle.shutdown();
                    break;
                }
                "/end" => handle.end_interview(),
                "/retry" => handle.retry(),
                answer => handle.submit_answer(answer),
            };
            if sent.is_err() {
                break;
            }
        }
    });

    let output = tokio::spawn(async move {
        while let Ok(update) = updates.recv().await {
            match update {
                SessionUpdate::Feedback(feedback) => println!("feedback> {feedback}"),
                SessionUpdate::Status(status) => println!("status> {status:?}"),
                SessionUpdate::Connection(state) => println!("connection> {state:?}"),
                SessionUpdate::InterviewEnded => println!("The interview has ended."),
                SessionUpdate::ReturnToEntry(Some(id)) => {
                    println!("Redirecting to {}", View::ResumeUpload.path(&id));
                }
                SessionUpdate::ReturnToEntry(None) => {
                    println!("Redirecting to {}", View::fallback_path());
                }
                SessionUpdate::MessageAppended(_) | SessionUpdate::Listening(_) => {}
            }
        }
    });

    session.run().await.context("Interview session failed")?;
    input.abort();
    output.abort();
    Ok(())
}
