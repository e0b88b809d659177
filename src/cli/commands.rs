use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "professor")]
#[command(author, version, about = "Lecture library with hosted transcription and Q&A")]
#[command(
    long_about = "Store lecture videos and transcripts, browse them by visibility or shareable code, and ask questions about a transcript"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List all lectures
    Lectures {
        /// Only titles starting with this text
        #[arg(short, long)]
        search: Option<String>,
    },

    /// Browse the most recent public lectures
    Discover {
        /// Only public titles starting with this text
        #[arg(short, long)]
        search: Option<String>,
    },

    /// Find a private lecture by its shareable code
    Code {
        /// Six-character private code
        code: String,
    },

    /// Show a lecture with its transcript
    Show {
        /// Lecture ID
        id: String,
    },

    /// Create a new lecture
    Create {
        /// Lecture title
        #[arg(short, long)]
        title: String,
        /// Hide from Discover; reachable by code only
        #[arg(long)]
        private: bool,
        /// URL of the uploaded video
        #[arg(long)]
        video_url: Option<String>,
        /// Transcribe the video before saving
        #[arg(long, requires = "video_url", conflicts_with = "transcript_file")]
        transcribe: bool,
        /// Attach a transcript from a text file
        #[arg(long)]
        transcript_file: Option<PathBuf>,
    },

    /// Delete a lecture (asks for confirmation)
    Delete {
        /// Lecture ID
        id: String,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Ask a question about a lecture transcript
    Ask {
        /// Lecture ID (omit when using --transcript-file)
        #[arg(required_unless_present = "transcript_file")]
        id: Option<String>,
        /// The question
        #[arg(short, long)]
        question: String,
        /// Ask about a local transcript (.txt) instead
        #[arg(long, conflicts_with = "id")]
        transcript_file: Option<PathBuf>,
    },

    /// Transcribe a video by URL and print the text
    Transcribe {
        /// Video URL
        url: String,
    },

    /// Issue a presigned upload URL for a video file
    #[command(name = "upload-url")]
    UploadUrl {
        /// File name
        #[arg(short, long)]
        name: String,
        /// MIME type, e.g. video/mp4
        #[arg(short = 't', long)]
        content_type: String,
    },

    /// Interactive dashboard
    Dashboard,

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Print config file path
    Path,
    /// Initialize default configuration
    Init,
}
