// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

use anyhow::{Context, Result};
use clap::{Args, CommandFactory, Parser, Subcommand};
use comfy_table::{ContentArrangement, Table};
use k8s_openapi::api::networking::v1::Ingress;
use nginx2traefik::{
    annotations::Annotation,
    certificates::{CertificateCache, CertificateLookup},
    constants::{
        DEFAULT_BURST_MULTIPLIER, DEFAULT_OUTPUT_DIR, ENTRY_POINT_WEB, ENTRY_POINT_WEBSECURE,
        TOKIO_WORKER_THREADS,
    },
    context::{ConvertOptions, EntryPointPolicy},
    convert::{convert_ingress, CONVERTERS},
    ingress::load_ingresses,
    kubernetes::{connect, list_ingresses, KubeCertificateSource},
    metrics::gather_metrics,
    output::BatchOutput,
    render::{render, ReportFormat},
};
use std::io::Write;
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// Migrate ingress-nginx annotated Ingresses to Traefik CRDs.
#[derive(Debug, Parser)]
#[command(name = "nginx2traefik", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Convert Ingresses from a file or a live cluster
    Convert(ConvertArgs),
    /// List the supported annotation vocabulary
    Annotations,
    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
    /// Print version information
    Version,
}

#[derive(Debug, Args)]
struct ConvertArgs {
    /// Ingress manifest (multi-document YAML or List); `-` reads stdin
    #[arg(short, long, conflicts_with_all = ["namespace", "all_namespaces", "context"])]
    file: Option<PathBuf>,

    /// Namespace to read Ingresses from (defaults to the kubeconfig namespace)
    #[arg(short, long)]
    namespace: Option<String>,

    /// Read Ingresses from all namespaces
    #[arg(short = 'A', long, conflicts_with = "namespace")]
    all_namespaces: bool,

    /// kubeconfig context to use
    #[arg(long)]
    context: Option<String>,

    /// Do not look up existing cert-manager Certificates in the cluster
    #[arg(long)]
    offline: bool,

    /// Directory for generated manifests and the report
    #[arg(short, long, default_value = DEFAULT_OUTPUT_DIR)]
    output_dir: PathBuf,

    /// Report layout printed to stdout
    #[arg(long, value_enum, default_value_t = ReportFormat::Table)]
    report: ReportFormat,

    /// Default burst multiplier for rate limits
    #[arg(
        long,
        env = "NGINX2TRAEFIK_BURST_MULTIPLIER",
        default_value_t = DEFAULT_BURST_MULTIPLIER,
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    burst_multiplier: u32,

    /// How IngressRoute entry points are chosen: `tls` or `backend-scheme`
    #[arg(long, env = "NGINX2TRAEFIK_ENTRY_POINT_POLICY", default_value = "tls")]
    entry_point_policy: EntryPointPolicy,

    /// Plain HTTP entry point name
    #[arg(long, default_value = ENTRY_POINT_WEB)]
    web_entry_point: String,

    /// TLS entry point name
    #[arg(long, default_value = ENTRY_POINT_WEBSECURE)]
    secure_entry_point: String,

    /// Write Prometheus text metrics to this file after the run
    #[arg(long)]
    metrics_file: Option<PathBuf>,
}

impl ConvertArgs {
    fn options(&self) -> ConvertOptions {
        ConvertOptions {
            burst_multiplier: self.burst_multiplier,
            entry_point_policy: self.entry_point_policy,
            web_entry_point: self.web_entry_point.clone(),
            secure_entry_point: self.secure_entry_point.clone(),
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging();

    match cli.command {
        Command::Convert(args) => run_convert(&args),
        Command::Annotations => {
            println!("{}", annotations_table());
            Ok(())
        }
        Command::Completions { shell } => {
            clap_complete::generate(
                shell,
                &mut Cli::command(),
                "nginx2traefik",
                &mut std::io::stdout(),
            );
            Ok(())
        }
        Command::Version => {
            println!("nginx2traefik {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

fn init_logging() {
    // Respects RUST_LOG (default info) and RUST_LOG_FORMAT=json.
    // Logs go to stderr; stdout carries the rendered report.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let log_format = std::env::var("RUST_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    match log_format.to_lowercase().as_str() {
        "json" => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .with_file(true)
                .with_line_number(true)
                .with_target(false)
                .json()
                .init();
        }
        _ => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .with_file(true)
                .with_line_number(true)
                .with_target(false)
                .with_ansi(true)
                .compact()
                .init();
        }
    }
}

fn run_convert(args: &ConvertArgs) -> Result<()> {
    let options = args.options();
    debug!(?options, "Conversion options");

    // Kept alive for the whole run: the certificate source blocks on it.
    let mut runtime = None;
    let mut lookup = None;

    let mut ingresses: Vec<Ingress> = if let Some(file) = &args.file {
        load_ingresses(file).with_context(|| format!("loading {}", file.display()))?
    } else {
        let rt = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(TOKIO_WORKER_THREADS)
            .thread_name("nginx2traefik")
            .enable_all()
            .build()?;

        let client = rt.block_on(connect(args.context.as_deref()))?;
        let namespace = if args.all_namespaces {
            None
        } else {
            Some(
                args.namespace
                    .clone()
                    .unwrap_or_else(|| client.default_namespace().to_string()),
            )
        };
        let ingresses = rt
            .block_on(list_ingresses(client.clone(), namespace.as_deref()))
            .context("listing Ingresses")?;

        if args.offline {
            info!("Offline mode: Certificates are generated from annotations only");
        } else {
            lookup = Some(CertificateCache::new(KubeCertificateSource::new(
                client,
                rt.handle().clone(),
            )));
        }
        runtime = Some(rt);
        ingresses
    };

    ingresses.sort_by(|a, b| {
        (&a.metadata.namespace, &a.metadata.name).cmp(&(&b.metadata.namespace, &b.metadata.name))
    });
    info!(count = ingresses.len(), "Converting Ingresses");

    let mut batch = BatchOutput::new();
    let mut aborted = 0usize;
    for ingress in &ingresses {
        let conversion = convert_ingress(
            ingress,
            &options,
            lookup.as_ref().map(|c| c as &dyn CertificateLookup),
        );
        if conversion.error.is_some() {
            aborted += 1;
        }
        batch.push(conversion.result);
    }

    let written = batch
        .write_to(&args.output_dir)
        .with_context(|| format!("writing output to {}", args.output_dir.display()))?;

    let rendered = render(&batch.report, args.report);
    if !rendered.is_empty() {
        let mut stdout = std::io::stdout().lock();
        writeln!(stdout, "{rendered}")?;
    }

    if let Some(path) = &args.metrics_file {
        std::fs::write(path, gather_metrics()?)
            .with_context(|| format!("writing metrics to {}", path.display()))?;
    }

    if aborted > 0 {
        warn!(aborted, "Some Ingresses were only partially converted");
    }
    info!(
        ingresses = ingresses.len(),
        files = written.files.len(),
        digest = %written.digest,
        result = %batch.summary().result_label(),
        "Conversion finished"
    );

    drop(lookup);
    drop(runtime);
    Ok(())
}

/// Which stage consumes an annotation.
fn handler_for(ann: Annotation) -> &'static str {
    if let Some(converter) = CONVERTERS.iter().find(|c| c.keys.contains(&ann)) {
        return converter.name;
    }
    match ann {
        Annotation::BackendProtocol | Annotation::GrpcBackend | Annotation::UseRegex => "routes",
        _ if ann.is_cert_manager() => "certificates",
        _ => "-",
    }
}

fn annotations_table() -> Table {
    let mut table = Table::new();
    table
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Annotation", "Handled by"]);
    for ann in Annotation::all() {
        table.add_row(vec![ann.as_str(), handler_for(ann)]);
    }
    table
}
