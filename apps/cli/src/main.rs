use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use coursedesk_catalog::{
    format_file_size, BundleAction, BundleForm, ChapterAction, ChapterForm, ContentDuration,
    ContentService, CourseAction, CourseForm, CourseId, DraftValidator, InMemoryCatalog, ModuleId,
    Route, SearchQuery, Status, SubmitOutcome, VideoAsset,
};
use coursedesk_settings::{AdminSettings, SettingsStore};
use serde::Serialize;
use tracing::debug;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(
    name = "coursedesk-cli",
    about = "Admin commands for the CourseDesk content catalog",
    author,
    version
)]
struct Cli {
    /// 指定工作區根目錄；預設為目前目錄。 / Workspace root (defaults to current directory).
    #[arg(long, global = true, value_name = "PATH")]
    workspace: Option<PathBuf>,
    /// 輸出除錯紀錄。 / Emit debug logs on stderr.
    #[arg(long, short, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 顯示內容統計。 / Show catalog totals.
    Dashboard,
    /// 列出或建立課程包。 / List or create bundles.
    #[command(subcommand)]
    Bundles(BundlesCommand),
    /// 列出或建立課程。 / List or create courses.
    #[command(subcommand)]
    Courses(CoursesCommand),
    /// 列出或建立章節。 / List or create chapters.
    #[command(subcommand)]
    Chapters(ChaptersCommand),
    /// 檢視或修改工作區設定。 / Show or change workspace settings.
    #[command(subcommand)]
    Settings(SettingsCommand),
}

#[derive(Args)]
struct ListArgs {
    /// 依標題（章節另含標籤）篩選。 / Filter by title (and tags for chapters).
    #[arg(long, value_name = "TEXT")]
    query: Option<String>,
    /// 以 JSON 輸出。 / Print JSON instead of a table.
    #[arg(long)]
    json: bool,
}

#[derive(Subcommand)]
enum BundlesCommand {
    /// 列出課程包。 / List bundles.
    List(ListArgs),
    /// 建立課程包。 / Create a bundle.
    Create(BundleCreateArgs),
}

#[derive(Args)]
struct BundleCreateArgs {
    /// 課程包標題。 / Bundle title.
    #[arg(long, default_value = "")]
    title: String,
    /// 課程包說明。 / Bundle description.
    #[arg(long)]
    description: Option<String>,
    /// 加入的課程編號，可重複。 / Course to include; repeatable.
    #[arg(long = "course", value_name = "ID")]
    courses: Vec<CourseId>,
    /// 直接發佈。 / Publish instead of saving as draft.
    #[arg(long)]
    published: bool,
}

#[derive(Subcommand)]
enum CoursesCommand {
    /// 列出課程。 / List courses.
    List(ListArgs),
    /// 建立課程。 / Create a course.
    Create(CourseCreateArgs),
}

#[derive(Args)]
struct CourseCreateArgs {
    /// 課程標題。 / Course title.
    #[arg(long, default_value = "")]
    title: String,
    /// 課程說明。 / Course description.
    #[arg(long)]
    description: Option<String>,
    /// 宣告的總時長；略過則加總章節。 / Advertised runtime; defaults to the sum of chapters.
    #[arg(long, value_name = "DURATION")]
    duration: Option<String>,
    /// 新增單元，可重複。 / Module to add; repeatable.
    #[arg(long = "module", value_name = "TITLE")]
    modules: Vec<String>,
    /// 新增章節，格式為 `單元|標題|時長`。 / Chapter as `MODULE|TITLE|DURATION`; repeatable.
    #[arg(long = "chapter", value_name = "MODULE|TITLE|DURATION")]
    chapters: Vec<String>,
    /// 直接發佈。 / Publish instead of saving as draft.
    #[arg(long)]
    published: bool,
}

#[derive(Subcommand)]
enum ChaptersCommand {
    /// 列出章節。 / List chapters.
    List(ListArgs),
    /// 上傳影片並建立章節。 / Upload a video and create a chapter.
    Create(ChapterCreateArgs),
}

#[derive(Args)]
struct ChapterCreateArgs {
    /// 章節標題。 / Chapter title.
    #[arg(long, default_value = "")]
    title: String,
    /// 章節說明。 / Chapter description.
    #[arg(long)]
    description: Option<String>,
    /// 所屬課程編號。 / Course the chapter belongs to.
    #[arg(long, value_name = "ID")]
    course: Option<CourseId>,
    /// 所屬單元編號。 / Module the chapter belongs to.
    #[arg(long, value_name = "ID")]
    module: Option<ModuleId>,
    /// 影片檔案。 / Video file to attach.
    #[arg(long, value_name = "FILE")]
    video: Option<PathBuf>,
    /// 覆寫依副檔名推測的 MIME 類型。 / Override the MIME type guessed from the extension.
    #[arg(long, value_name = "TYPE")]
    mime: Option<String>,
    /// 章節時長，例如 `15 min`。 / Chapter runtime such as `15 min`.
    #[arg(long, value_name = "DURATION")]
    duration: Option<String>,
    /// 標籤，可重複。 / Tag; repeatable.
    #[arg(long = "tag", value_name = "TAG")]
    tags: Vec<String>,
    /// 直接發佈。 / Publish instead of saving as draft.
    #[arg(long)]
    published: bool,
}

#[derive(Subcommand)]
enum SettingsCommand {
    /// 顯示目前設定。 / Show the current settings.
    Show,
    /// 修改設定並寫回工作區。 / Change settings and save them to the workspace.
    Set(SettingsSetArgs),
}

#[derive(Args)]
struct SettingsSetArgs {
    /// 上傳上限（MiB）。 / Upload limit in MiB.
    #[arg(long, value_name = "MIB")]
    max_upload_mib: Option<u64>,
    /// 接受的 MIME 前綴。 / Accepted MIME prefix.
    #[arg(long, value_name = "PREFIX")]
    mime_prefix: Option<String>,
    /// 每列顯示的標籤數。 / Tags shown per chapter row.
    #[arg(long, value_name = "COUNT")]
    tag_preview: Option<usize>,
}

fn main() {
    if let Err(err) = run() {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let Cli {
        workspace,
        verbose,
        command,
    } = Cli::parse();
    init_tracing(verbose);

    let workspace_root = resolve_workspace(workspace)?;
    let mut store = SettingsStore::open_workspace(&workspace_root).with_context(|| {
        format!(
            "failed to load settings from {}",
            SettingsStore::workspace_path(&workspace_root).display()
        )
    })?;
    debug!(workspace = %workspace_root.display(), "opened workspace");

    match command {
        Commands::Settings(subcommand) => execute_settings_command(subcommand, &mut store),
        Commands::Dashboard => execute_dashboard(&open_catalog(store.settings())?),
        Commands::Bundles(subcommand) => {
            let mut catalog = open_catalog(store.settings())?;
            execute_bundles_command(subcommand, &mut catalog)
        }
        Commands::Courses(subcommand) => {
            let mut catalog = open_catalog(store.settings())?;
            execute_courses_command(subcommand, &mut catalog)
        }
        Commands::Chapters(subcommand) => {
            let mut catalog = open_catalog(store.settings())?;
            execute_chapters_command(subcommand, &mut catalog, store.settings())
        }
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .try_init();
}

fn open_catalog(settings: &AdminSettings) -> Result<InMemoryCatalog> {
    let validator = DraftValidator::new(settings.uploads.media_policy());
    InMemoryCatalog::demo(validator).context("failed to load the demo catalog")
}

fn execute_dashboard(catalog: &InMemoryCatalog) -> Result<()> {
    let stats = catalog.stats();
    println!("CourseDesk dashboard ({})", Route::Dashboard);
    println!("  Bundles:  {}", stats.bundles);
    println!("  Courses:  {}", stats.courses);
    println!("  Modules:  {}", stats.modules);
    println!("  Chapters: {}", stats.chapters);
    Ok(())
}

fn execute_bundles_command(command: BundlesCommand, catalog: &mut InMemoryCatalog) -> Result<()> {
    match command {
        BundlesCommand::List(args) => {
            let bundles = catalog.list_bundles(query_of(&args).as_ref());
            if args.json {
                return print_json(&bundles);
            }
            if bundles.is_empty() {
                println!("No bundles found.");
            }
            for bundle in &bundles {
                println!(
                    "#{} {} [{}] {} courses, {}",
                    bundle.id,
                    bundle.title,
                    bundle.status,
                    bundle.courses.len(),
                    bundle.total_duration
                );
                for course in &bundle.courses {
                    println!("    - {} ({})", course.title, course.duration);
                }
            }
            Ok(())
        }
        BundlesCommand::Create(args) => create_bundle(args, catalog),
    }
}

fn create_bundle(args: BundleCreateArgs, catalog: &mut InMemoryCatalog) -> Result<()> {
    let mut form = BundleForm::new();
    form.apply(BundleAction::SetTitle(args.title))?;
    form.apply(BundleAction::SetDescription(
        args.description.unwrap_or_default(),
    ))?;
    form.apply(BundleAction::SetStatus(status_of(args.published)))?;
    for id in args.courses {
        form.add_course_by_id(&*catalog, id)?;
    }

    let bundle = created(form.submit(catalog))?;
    println!(
        "#{} {} [{}] {} courses, {}",
        bundle.id,
        bundle.title,
        bundle.status,
        bundle.courses.len(),
        form.total_duration()
    );
    Ok(())
}

fn execute_courses_command(command: CoursesCommand, catalog: &mut InMemoryCatalog) -> Result<()> {
    match command {
        CoursesCommand::List(args) => {
            let courses = catalog.list_courses(query_of(&args).as_ref());
            if args.json {
                return print_json(&courses);
            }
            if courses.is_empty() {
                println!("No courses found.");
            }
            for course in &courses {
                let chapters: usize = course
                    .modules
                    .iter()
                    .map(|module| module.chapters.len())
                    .sum();
                println!(
                    "#{} {} [{}] {} modules, {} chapters, {}",
                    course.id,
                    course.title,
                    course.status,
                    course.modules.len(),
                    chapters,
                    course.duration
                );
            }
            Ok(())
        }
        CoursesCommand::Create(args) => create_course(args, catalog),
    }
}

fn create_course(args: CourseCreateArgs, catalog: &mut InMemoryCatalog) -> Result<()> {
    let mut form = CourseForm::new();
    form.apply(CourseAction::SetTitle(args.title))?;
    form.apply(CourseAction::SetDescription(
        args.description.unwrap_or_default(),
    ))?;
    form.apply(CourseAction::SetStatus(status_of(args.published)))?;
    if let Some(duration) = args.duration {
        let duration: ContentDuration = duration
            .parse()
            .with_context(|| format!("invalid course duration '{duration}'"))?;
        form.apply(CourseAction::SetDuration(Some(duration)))?;
    }
    for title in args.modules {
        form.apply(CourseAction::OpenModuleInput)?;
        form.apply(CourseAction::SetModuleTitle(title))?;
        form.apply(CourseAction::AddModule)?;
    }
    for entry in &args.chapters {
        let (module_title, title, duration) = parse_chapter_entry(entry)?;
        let Some(module) = form.module_by_title(module_title).map(|module| module.id) else {
            bail!("module '{module_title}' is not declared; add it with --module");
        };
        form.apply(CourseAction::AddChapter {
            module,
            title: title.to_string(),
            duration: duration.to_string(),
        })?;
    }

    let course = created(form.submit(catalog))?;
    println!(
        "#{} {} [{}] {} modules, {} chapters, {}",
        course.id,
        course.title,
        course.status,
        form.module_count(),
        form.total_chapters(),
        course.duration
    );
    Ok(())
}

fn parse_chapter_entry(entry: &str) -> Result<(&str, &str, &str)> {
    let mut parts = entry.splitn(3, '|');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(module), Some(title), Some(duration)) => Ok((module, title, duration)),
        _ => bail!("chapter '{entry}' must look like MODULE|TITLE|DURATION"),
    }
}

fn execute_chapters_command(
    command: ChaptersCommand,
    catalog: &mut InMemoryCatalog,
    settings: &AdminSettings,
) -> Result<()> {
    match command {
        ChaptersCommand::List(args) => {
            let chapters = catalog.list_chapters(query_of(&args).as_ref());
            if args.json {
                return print_json(&chapters);
            }
            if chapters.is_empty() {
                println!("No chapters found.");
            }
            for listing in &chapters {
                let chapter = &listing.chapter;
                println!(
                    "#{} {} [{}] {}  {} / {}  tags: {}",
                    chapter.id,
                    chapter.title,
                    chapter.status,
                    chapter.duration,
                    listing.course_title,
                    listing.module_title,
                    settings.listing.preview_tags(&chapter.tags)
                );
            }
            Ok(())
        }
        ChaptersCommand::Create(args) => create_chapter(args, catalog, settings),
    }
}

fn create_chapter(
    args: ChapterCreateArgs,
    catalog: &mut InMemoryCatalog,
    settings: &AdminSettings,
) -> Result<()> {
    let mut form = ChapterForm::new(settings.uploads.media_policy());
    form.apply(ChapterAction::SetTitle(args.title))?;
    form.apply(ChapterAction::SetDescription(
        args.description.unwrap_or_default(),
    ))?;
    form.apply(ChapterAction::SetStatus(status_of(args.published)))?;
    form.apply(ChapterAction::SetDuration(args.duration.unwrap_or_default()))?;
    form.select_course(&*catalog, args.course)?;
    // Without a course, submit reports the first missing field.
    if args.course.is_some() {
        form.select_module(&*catalog, args.module)?;
    }
    for tag in args.tags {
        form.apply(ChapterAction::SetTagInput(tag))?;
        form.apply(ChapterAction::AddTag)?;
    }
    if let Some(path) = args.video {
        let asset = video_asset(&resolve_input_path(&path)?, args.mime)?;
        debug!(file = %asset.file_name, size = asset.size_bytes, mime = %asset.mime_type, "attaching video");
        form.apply(ChapterAction::AttachVideo(asset))?;
    }

    let chapter = created(form.submit(catalog))?;
    let size = chapter
        .video
        .as_ref()
        .map(|video| format!("{} ({})", video.file_name, format_file_size(video.size_bytes)))
        .unwrap_or_default();
    println!(
        "#{} {} [{}] {}  {}",
        chapter.id, chapter.title, chapter.status, chapter.duration, size
    );
    Ok(())
}

fn video_asset(path: &Path, mime: Option<String>) -> Result<VideoAsset> {
    let metadata =
        fs::metadata(path).with_context(|| format!("failed to read {}", path.display()))?;
    if !metadata.is_file() {
        bail!("'{}' is not a file", path.display());
    }
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    let mime = mime.unwrap_or_else(|| guess_mime(path).to_string());
    Ok(VideoAsset::new(file_name, mime, metadata.len()))
}

fn guess_mime(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    match extension.as_str() {
        "mp4" => "video/mp4",
        "m4v" => "video/x-m4v",
        "mov" => "video/quicktime",
        "webm" => "video/webm",
        "mkv" => "video/x-matroska",
        "avi" => "video/x-msvideo",
        "ogv" => "video/ogg",
        _ => "application/octet-stream",
    }
}

fn execute_settings_command(command: SettingsCommand, store: &mut SettingsStore) -> Result<()> {
    match command {
        SettingsCommand::Show => {
            let settings = store.settings();
            let policy = settings.uploads.media_policy();
            println!("Settings file: {}", store.path().display());
            println!("Max upload size: {}", format_file_size(policy.max_bytes));
            println!("Accepted media: {}*", policy.mime_prefix);
            println!("Tag preview: {}", settings.listing.tag_preview);
            Ok(())
        }
        SettingsCommand::Set(args) => {
            if args.max_upload_mib.is_none()
                && args.mime_prefix.is_none()
                && args.tag_preview.is_none()
            {
                bail!("nothing to change; pass --max-upload-mib, --mime-prefix or --tag-preview");
            }
            store
                .update(|settings| {
                    if let Some(limit) = args.max_upload_mib {
                        settings.uploads.max_upload_mib = limit;
                    }
                    if let Some(prefix) = args.mime_prefix {
                        settings.uploads.accepted_mime_prefix = prefix;
                    }
                    if let Some(count) = args.tag_preview {
                        settings.listing.tag_preview = count;
                    }
                })
                .with_context(|| format!("failed to save {}", store.path().display()))?;
            println!("Saved settings to {}", store.path().display());
            Ok(())
        }
    }
}

/// Prints the success notice and where the admin would land next, or turns
/// the rejection notice into the command's error.
fn created<T>(outcome: SubmitOutcome<T>) -> Result<T> {
    match outcome {
        SubmitOutcome::Created {
            entity,
            notice,
            redirect,
        } => {
            println!("{notice}");
            println!("Next: {redirect}");
            Ok(entity)
        }
        SubmitOutcome::Rejected { notice } => bail!("{notice}"),
    }
}

fn query_of(args: &ListArgs) -> Option<SearchQuery> {
    args.query
        .as_deref()
        .map(SearchQuery::new)
        .filter(|query| !query.is_blank())
}

fn status_of(published: bool) -> Status {
    if published {
        Status::Published
    } else {
        Status::Draft
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let payload = serde_json::to_string_pretty(value).context("failed to encode JSON")?;
    println!("{payload}");
    Ok(())
}

fn resolve_workspace(workspace: Option<PathBuf>) -> Result<PathBuf> {
    match workspace {
        Some(path) => resolve_input_path(&path),
        None => std::env::current_dir().context("determine current directory"),
    }
}

fn resolve_input_path(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(std::env::current_dir()
            .context("determine current directory")?
            .join(path))
    }
}
