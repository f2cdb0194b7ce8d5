use std::sync::Arc;

use anyhow::Context as _;
use tokio::io::{AsyncBufReadExt as _, BufReader};

use crate::cli::BrowseArgs;
use crate::client::{OpenLibraryClient, SearchBackend};
use crate::config::ClientConfig;
use crate::model::{LanguageFilter, Scope};
use crate::render::Renderer;
use crate::session::SearchSession;

const HELP: &str = "\
Type text to search. Commands:
  :scope all|title|author|subject|isbn
  :lang <code>|all     :from <year>|-     :to <year>|-     :free on|off
  :page <n>            :next              :prev            :retry
  :go                  (search now without waiting)
  :show <n>            :close             :fav <n>         :favs
  :help                :quit
";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BrowseCommand {
    Query(String),
    Scope(Scope),
    Language(LanguageFilter),
    YearFrom(Option<u32>),
    YearTo(Option<u32>),
    FreeToRead(bool),
    Page(u32),
    Next,
    Previous,
    Retry,
    Submit,
    Show(usize),
    Close,
    Favorite(usize),
    Favorites,
    Help,
    Quit,
}

impl BrowseCommand {
    /// Lines starting with `:` are commands; anything else is query text.
    pub fn parse(line: &str) -> anyhow::Result<Self> {
        let Some(command) = line.trim().strip_prefix(':') else {
            return Ok(Self::Query(line.trim_end_matches(['\r', '\n']).to_owned()));
        };
        let (name, arg) = match command.split_once(char::is_whitespace) {
            Some((name, arg)) => (name, arg.trim()),
            None => (command, ""),
        };

        let parsed = match name {
            "scope" => Self::Scope(Scope::parse(arg)),
            "lang" => Self::Language(LanguageFilter::parse(arg)?),
            "from" => Self::YearFrom(parse_year(arg)?),
            "to" => Self::YearTo(parse_year(arg)?),
            "free" => Self::FreeToRead(parse_switch(arg)?),
            "page" => Self::Page(parse_number(arg)?),
            "next" => Self::Next,
            "prev" => Self::Previous,
            "retry" => Self::Retry,
            "go" => Self::Submit,
            "show" => Self::Show(parse_index(arg)?),
            "close" => Self::Close,
            "fav" => Self::Favorite(parse_index(arg)?),
            "favs" => Self::Favorites,
            "help" | "h" | "?" => Self::Help,
            "quit" | "q" | "exit" => Self::Quit,
            other => anyhow::bail!("unknown command: :{other} (try :help)"),
        };
        Ok(parsed)
    }
}

fn parse_number(arg: &str) -> anyhow::Result<u32> {
    let n = arg
        .parse::<u32>()
        .with_context(|| format!("expected a number, got {arg:?}"))?;
    if n == 0 {
        anyhow::bail!("numbers start at 1");
    }
    Ok(n)
}

fn parse_index(arg: &str) -> anyhow::Result<usize> {
    Ok(parse_number(arg)? as usize - 1)
}

fn parse_year(arg: &str) -> anyhow::Result<Option<u32>> {
    if arg.is_empty() || arg == "-" {
        return Ok(None);
    }
    arg.parse::<u32>()
        .map(Some)
        .with_context(|| format!("expected a year or `-`, got {arg:?}"))
}

fn parse_switch(arg: &str) -> anyhow::Result<bool> {
    match arg.to_ascii_lowercase().as_str() {
        "on" | "yes" | "true" | "1" => Ok(true),
        "off" | "no" | "false" | "0" => Ok(false),
        other => anyhow::bail!("expected on/off, got {other:?}"),
    }
}

pub async fn run(args: BrowseArgs, config: ClientConfig) -> anyhow::Result<()> {
    let (scope, filters) = args.filters.resolve()?;
    let backend: Arc<dyn SearchBackend> = Arc::new(OpenLibraryClient::new(&config.user_agent));

    let mut session = SearchSession::new(backend, &config);
    session.set_scope(scope);
    session.set_filters(filters);
    if let Some(query) = args.query {
        session.set_query(query);
    }

    let mut results = session.subscribe();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!("{HELP}");
    print_view(&session, &config)?;

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("read stdin")? else {
                    break;
                };
                match BrowseCommand::parse(&line) {
                    Ok(BrowseCommand::Quit) => break,
                    Ok(command) => apply(&mut session, &config, command)?,
                    Err(err) => println!("{err:#}"),
                }
            }
            settled = session.query_settled() => {
                settled?;
            }
            changed = results.changed() => {
                changed.context("search results closed")?;
                results.borrow_and_update();
                print_view(&session, &config)?;
            }
            _ = tokio::signal::ctrl_c() => {
                break;
            }
        }
    }

    Ok(())
}

fn apply(
    session: &mut SearchSession,
    config: &ClientConfig,
    command: BrowseCommand,
) -> anyhow::Result<()> {
    match command {
        BrowseCommand::Query(text) => session.set_query(text),
        BrowseCommand::Scope(scope) => session.set_scope(scope),
        BrowseCommand::Language(language) => {
            session.update_filters(|filters| filters.language = language)
        }
        BrowseCommand::YearFrom(year) => session.update_filters(|filters| filters.year_from = year),
        BrowseCommand::YearTo(year) => session.update_filters(|filters| filters.year_to = year),
        BrowseCommand::FreeToRead(on) => {
            session.update_filters(|filters| filters.free_to_read = on)
        }
        BrowseCommand::Page(page) => session.set_page(page),
        BrowseCommand::Next => {
            if !session.next_page() {
                println!("already on the last page");
            }
        }
        BrowseCommand::Previous => {
            if !session.previous_page() {
                println!("already on the first page");
            }
        }
        BrowseCommand::Retry => session.retry(),
        BrowseCommand::Submit => session.submit_now(),
        BrowseCommand::Show(index) => {
            let Some(book) = session.show_details(index).cloned() else {
                println!("no book #{}", index + 1);
                return Ok(());
            };
            let text = renderer(session, config)
                .details(&book)
                .context("render details")?;
            print!("{text}");
        }
        BrowseCommand::Close => {
            session.close_details();
            print_view(session, config)?;
        }
        BrowseCommand::Favorite(index) => {
            let Some(book) = session.book(index) else {
                println!("no book #{}", index + 1);
                return Ok(());
            };
            let on = session.toggle_favorite(&book.key);
            let verb = if on { "added to" } else { "removed from" };
            println!("{} {verb} favorites", book.display_title());
        }
        BrowseCommand::Favorites => {
            if session.favorites().is_empty() {
                println!("no favorites yet");
            }
            for key in session.favorites().iter() {
                println!("♥ {key}");
            }
        }
        BrowseCommand::Help => println!("{HELP}"),
        BrowseCommand::Quit => {}
    }
    Ok(())
}

fn renderer<'a>(session: &'a SearchSession, config: &'a ClientConfig) -> Renderer<'a> {
    Renderer {
        covers_url: &config.covers_url,
        site_url: &config.site_url,
        favorites: session.favorites(),
    }
}

fn print_view(session: &SearchSession, config: &ClientConfig) -> anyhow::Result<()> {
    let input = session.input();
    println!(
        "--- {} | {} | page {}",
        input.scope.label(),
        input.filters.language.label(),
        input.page
    );
    let text = renderer(session, config)
        .view(&session.view())
        .context("render results")?;
    print!("{text}");
    Ok(())
}
