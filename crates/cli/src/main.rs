use analytics::{Catalog, Metric, RatingStore, TagStore};
use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use colored::Colorize;
use data_loader::parser::{self, LINKS_HEADER};
use data_loader::{DEFAULT_MAX_ROWS, Dataset, LoadOptions};
use enrichment::{
    DEFAULT_ENRICH_LIMIT, FinanceClient, Field, ImdbClient, Links, get_imdb, get_imdb_rating,
};
use serde::Serialize;
use std::fmt::Display;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// lens-report - MovieLens dataset reports
#[derive(Parser)]
#[command(name = "lens-report")]
#[command(about = "Reports over the MovieLens latest-small dataset", long_about = None)]
struct Cli {
    /// Path to MovieLens dataset directory
    #[arg(short, long, global = true, default_value = "data/ml-latest-small")]
    data_dir: PathBuf,

    /// Rows read from each file (0 reads everything)
    #[arg(long, global = true, default_value_t = DEFAULT_MAX_ROWS)]
    max_rows: usize,

    /// Print results as JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the first lines of a data file
    Head {
        #[arg(value_enum)]
        file: DataFile,

        /// Number of data lines to print
        #[arg(short = 'n', long, default_value = "5")]
        lines: usize,
    },

    /// Movie catalog reports
    #[command(subcommand)]
    Movies(MoviesCommand),

    /// Per-movie rating reports
    #[command(subcommand)]
    Ratings(RatingsCommand),

    /// Per-user rating reports
    #[command(subcommand)]
    Users(UsersCommand),

    /// Tag reports
    #[command(subcommand)]
    Tags(TagsCommand),

    /// IMDb metadata for the movies in links.csv
    Links(LinksArgs),

    /// Print one row of a company's financial statement
    Financials {
        /// Stock ticker, e.g. MSFT
        ticker: String,

        /// Row title, e.g. "Total Revenue"
        field: String,

        /// Seconds to wait before the request
        #[arg(long, default_value = "5")]
        delay_secs: u64,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum DataFile {
    Movies,
    Ratings,
    Tags,
    Links,
}

/// Number of results for top-N reports (negative gives an empty report)
#[derive(Args)]
struct TopN {
    #[arg(short = 'n', long = "top", default_value = "10", allow_negative_numbers = true)]
    n: i64,
}

#[derive(Subcommand)]
enum MoviesCommand {
    /// Number of movies per release year
    Release,
    /// Number of movies per genre
    Genres,
    /// Movies with the most genres
    MostGenres(TopN),
    /// Titles in a genre
    ByGenre { genre: String },
    /// Movies released in a year, most popular genres first
    ByYear { year: u16 },
    /// Most frequent genre combinations
    Combinations(TopN),
    /// Find a movie id by its exact title
    Lookup { title: String },
}

#[derive(Subcommand)]
enum RatingsCommand {
    /// Number of ratings per year
    ByYear,
    /// Number of ratings per rating value
    ByRating,
    /// Movies with the most ratings
    MostRated(TopN),
    /// Best rated movies
    Top {
        #[command(flatten)]
        top: TopN,
        #[arg(long, default_value = "average")]
        metric: Metric,
    },
    /// Movies with the largest rating variance
    Controversial(TopN),
    /// Yearly count and mean rating, optionally for one genre or release year
    AverageByYear {
        #[arg(long)]
        genre: Option<String>,
        #[arg(long)]
        release_year: Option<u16>,
    },
}

#[derive(Subcommand)]
enum UsersCommand {
    /// Distinct users per rating value
    ByRatingValue,
    /// Users per average (or median) rating bucket
    ByUserRating {
        #[arg(long, default_value = "average")]
        metric: Metric,
    },
    /// Users with the largest rating variance
    Controversial(TopN),
    /// Yearly rating trend for a genre
    Trend { genre: String },
}

#[derive(Subcommand)]
enum TagsCommand {
    /// Tags with the most words
    MostWords(TopN),
    /// Longest tags
    Longest(TopN),
    /// Tags that are both among the wordiest and the longest
    WordsAndLongest(TopN),
    /// Most used tags
    Popular(TopN),
    /// Tags containing a word
    Search { word: String },
    /// Number of tags per movie
    Stats,
    /// Tags of one movie
    ForMovie { title: String },
    /// Best rated movies carrying a tag
    TopMovies {
        tag: String,
        #[command(flatten)]
        top: TopN,
    },
}

#[derive(Args)]
struct LinksArgs {
    /// How many ids from links.csv to fetch
    #[arg(long, default_value_t = DEFAULT_ENRICH_LIMIT)]
    limit: usize,

    /// Request timeout in seconds
    #[arg(long, default_value = "10")]
    timeout_secs: u64,

    #[command(subcommand)]
    command: LinksCommand,
}

#[derive(Subcommand)]
enum LinksCommand {
    /// Rows of the requested fields, highest IMDb id first
    Details {
        /// Comma-separated fields (default: all)
        #[arg(long, value_delimiter = ',')]
        fields: Vec<Field>,
    },
    /// Title and IMDb rating, best first
    Ratings,
    /// Directors by number of movies
    Directors(TopN),
    /// Movies by budget
    Expensive(TopN),
    /// Movies by worldwide gross minus budget
    Profitable(TopN),
    /// Movies by runtime
    Longest(TopN),
    /// Movies by budget per minute
    CostPerMinute(TopN),
}

fn main() -> Result<()> {
    // Logs go to stderr so stdout only carries the report
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let out = Output { json: cli.json };
    let options = LoadOptions::default().with_max_rows(match cli.max_rows {
        0 => None,
        n => Some(n),
    });

    match &cli.command {
        Commands::Head { file, lines } => handle_head(&cli, &options, &out, *file, *lines)?,
        Commands::Movies(command) => handle_movies(&cli, &options, &out, command)?,
        Commands::Ratings(command) => handle_ratings(&cli, &options, &out, command)?,
        Commands::Users(command) => handle_users(&cli, &options, &out, command)?,
        Commands::Tags(command) => handle_tags(&cli, &options, &out, command)?,
        Commands::Links(args) => handle_links(&cli, &options, &out, args)?,
        Commands::Financials {
            ticker,
            field,
            delay_secs,
        } => handle_financials(&out, ticker, field, *delay_secs)?,
    }

    Ok(())
}

/// Text or JSON rendering of report rows
struct Output {
    json: bool,
}

impl Output {
    fn json_value<T: Serialize + ?Sized>(&self, value: &T) -> Result<()> {
        let text = serde_json::to_string_pretty(value).context("Failed to serialize report")?;
        println!("{}", text);
        Ok(())
    }

    fn header(&self, title: &str) {
        println!("{}", title.bold().blue());
    }

    fn empty_note(&self, empty: bool) {
        if empty {
            println!("  {}", "(no results)".dimmed());
        }
    }

    /// Ranked (key, value) rows
    fn pairs<K, V>(&self, title: &str, rows: &[(K, V)]) -> Result<()>
    where
        K: Display + Serialize,
        V: Display + Serialize,
    {
        if self.json {
            return self.json_value(rows);
        }
        self.header(title);
        self.empty_note(rows.is_empty());
        for (rank, (key, value)) in rows.iter().enumerate() {
            println!("{:>4}. {}: {}", (rank + 1).to_string().green(), key, value);
        }
        Ok(())
    }

    /// Plain list of items
    fn items<T: Display + Serialize>(&self, title: &str, items: &[T]) -> Result<()> {
        if self.json {
            return self.json_value(items);
        }
        self.header(title);
        self.empty_note(items.is_empty());
        for item in items {
            println!("{}{}", "• ".green(), item);
        }
        Ok(())
    }
}

fn load_dataset(cli: &Cli, options: &LoadOptions) -> Result<Dataset> {
    let start = Instant::now();
    let dataset = Dataset::load_from_dir(&cli.data_dir, options).with_context(|| {
        format!("Failed to load MovieLens dataset from {}", cli.data_dir.display())
    })?;
    tracing::info!("Loaded dataset in {:?}", start.elapsed());
    Ok(dataset)
}

fn load_catalog(cli: &Cli, options: &LoadOptions) -> Result<Catalog> {
    let path = options.movies_path(&cli.data_dir);
    Catalog::load(&path, options.max_rows)
        .with_context(|| format!("Failed to load movies from {}", path.display()))
}

/// Handle the 'head' command
fn handle_head(
    cli: &Cli,
    options: &LoadOptions,
    out: &Output,
    file: DataFile,
    lines: usize,
) -> Result<()> {
    let path = match file {
        DataFile::Movies => options.movies_path(&cli.data_dir),
        DataFile::Ratings => options.ratings_path(&cli.data_dir),
        DataFile::Tags => options.tags_path(&cli.data_dir),
        DataFile::Links => options.links_path(&cli.data_dir),
    };
    let head = parser::head_lines(&path, lines)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    if out.json {
        return out.json_value(&head);
    }
    for line in head {
        println!("{}", line);
    }
    Ok(())
}

/// Handle the 'movies' commands
fn handle_movies(
    cli: &Cli,
    options: &LoadOptions,
    out: &Output,
    command: &MoviesCommand,
) -> Result<()> {
    let catalog = load_catalog(cli, options)?;
    match command {
        MoviesCommand::Release => out.pairs("Movies per release year:", &catalog.dist_by_release()),
        MoviesCommand::Genres => out.pairs("Movies per genre:", &catalog.dist_by_genres()),
        MoviesCommand::MostGenres(top) => {
            out.pairs("Movies with the most genres:", &catalog.most_genres(top.n))
        }
        MoviesCommand::ByGenre { genre } => out.items(
            &format!("{} movies:", genre),
            &catalog.movies_by_genre(genre),
        ),
        MoviesCommand::ByYear { year } => {
            let movies = catalog.movies_by_year(*year);
            if out.json {
                return out.json_value(&movies);
            }
            out.header(&format!("Movies released in {}:", year));
            out.empty_note(movies.is_empty());
            for movie in movies {
                println!("{}{} [{}]", "• ".green(), movie.title, movie.genres.join(", "));
            }
            Ok(())
        }
        MoviesCommand::Combinations(top) => out.pairs(
            "Most common genre combinations:",
            &catalog.common_genre_combinations(top.n),
        ),
        MoviesCommand::Lookup { title } => {
            let id = catalog.movie_id_by_title(title);
            if out.json {
                return out.json_value(&id);
            }
            match id {
                Some(id) => println!("{}: {}", title, id.to_string().green()),
                None => println!("{}", format!("Movie '{}' not found", title).yellow()),
            }
            Ok(())
        }
    }
}

fn build_stores(dataset: Dataset) -> (RatingStore, TagStore) {
    let catalog = Arc::new(Catalog::new(dataset.movies));
    (
        RatingStore::new(dataset.ratings, catalog),
        TagStore::new(dataset.tags),
    )
}

/// Handle the 'ratings' commands
fn handle_ratings(
    cli: &Cli,
    options: &LoadOptions,
    out: &Output,
    command: &RatingsCommand,
) -> Result<()> {
    let (store, _) = build_stores(load_dataset(cli, options)?);
    let movies = store.movies();
    match command {
        RatingsCommand::ByYear => out.pairs("Ratings per year:", &movies.dist_by_year()),
        RatingsCommand::ByRating => out.pairs("Ratings per value:", &movies.dist_by_rating()),
        RatingsCommand::MostRated(top) => {
            out.pairs("Most rated movies:", &movies.top_by_num_of_ratings(top.n))
        }
        RatingsCommand::Top { top, metric } => out.pairs(
            &format!("Top movies by {} rating:", metric),
            &movies.top_by_ratings(top.n, *metric),
        ),
        RatingsCommand::Controversial(top) => {
            out.pairs("Most controversial movies:", &movies.top_controversial(top.n))
        }
        RatingsCommand::AverageByYear {
            genre,
            release_year,
        } => {
            let summary = movies.average_rating_by_year(genre.as_deref(), *release_year);
            if out.json {
                return out.json_value(&summary);
            }
            out.header("Average rating per year:");
            out.empty_note(summary.is_empty());
            for row in summary {
                println!(
                    "  {}: {:.2} ({} ratings)",
                    row.year.to_string().green(),
                    row.average_rating,
                    row.count
                );
            }
            Ok(())
        }
    }
}

/// Handle the 'users' commands
fn handle_users(
    cli: &Cli,
    options: &LoadOptions,
    out: &Output,
    command: &UsersCommand,
) -> Result<()> {
    let (store, _) = build_stores(load_dataset(cli, options)?);
    let users = store.users();
    match command {
        UsersCommand::ByRatingValue => out.pairs(
            "Users per rating value:",
            &users.dist_by_num_of_ratings(),
        ),
        UsersCommand::ByUserRating { metric } => out.pairs(
            &format!("Users per {} rating:", metric),
            &users.dist_by_user_rating(*metric),
        ),
        UsersCommand::Controversial(top) => {
            out.pairs("Most controversial users:", &users.top_controversial(top.n))
        }
        UsersCommand::Trend { genre } => {
            let trend = users.genre_rating_trend_by_year(genre);
            if out.json {
                return out.json_value(&trend);
            }
            out.header(&format!("{} ratings per year:", genre));
            out.empty_note(trend.is_empty());
            for row in trend {
                println!(
                    "  {}: {:.2} ({} ratings, {} users)",
                    row.year.to_string().green(),
                    row.average_rating,
                    row.ratings,
                    row.users
                );
            }
            Ok(())
        }
    }
}

/// Handle the 'tags' commands
fn handle_tags(cli: &Cli, options: &LoadOptions, out: &Output, command: &TagsCommand) -> Result<()> {
    let (store, tags) = build_stores(load_dataset(cli, options)?);
    let catalog = store.catalog();
    match command {
        TagsCommand::MostWords(top) => out.pairs("Tags with the most words:", &tags.most_words(top.n)),
        TagsCommand::Longest(top) => out.items("Longest tags:", &tags.longest(top.n)),
        TagsCommand::WordsAndLongest(top) => out.items(
            "Wordiest and longest tags:",
            &tags.most_words_and_longest(top.n),
        ),
        TagsCommand::Popular(top) => out.pairs("Most popular tags:", &tags.most_popular(top.n)),
        TagsCommand::Search { word } => {
            out.items(&format!("Tags containing '{}':", word), &tags.tags_with(word))
        }
        TagsCommand::Stats => out.pairs("Tags per movie:", &tags.tag_statistics(catalog)),
        TagsCommand::ForMovie { title } => out.items(
            &format!("Tags of {}:", title),
            &tags.tags_for_movie(title, catalog),
        ),
        TagsCommand::TopMovies { tag, top } => out.pairs(
            &format!("Best rated movies tagged '{}':", tag),
            &tags.top_movies_by_tag(tag, &store, catalog, top.n),
        ),
    }
}

/// Handle the 'links' commands
fn handle_links(cli: &Cli, options: &LoadOptions, out: &Output, args: &LinksArgs) -> Result<()> {
    let path = options.links_path(&cli.data_dir);
    let client = ImdbClient::new().with_timeout(Duration::from_secs(args.timeout_secs));

    let ids = || -> Result<Vec<String>> {
        let ids = parser::read_column(&path, LINKS_HEADER, "imdbId", None)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Ok(ids.into_iter().take(args.limit).collect())
    };
    let links = || {
        Links::load(&path, &client, args.limit)
            .with_context(|| format!("Failed to load links from {}", path.display()))
    };

    match &args.command {
        LinksCommand::Details { fields } => {
            let fields = if fields.is_empty() {
                Field::ALL.to_vec()
            } else {
                fields.clone()
            };
            let rows = get_imdb(&client, ids()?, &fields);
            if out.json {
                return out.json_value(&rows);
            }
            let mut columns = vec!["imdbId".to_string()];
            columns.extend(fields.iter().map(Field::to_string));
            out.header(&columns.join(" | "));
            out.empty_note(rows.is_empty());
            for row in rows {
                println!("  {}", row.join(" | "));
            }
            Ok(())
        }
        LinksCommand::Ratings => {
            let ratings = get_imdb_rating(&client, ids()?);
            if out.json {
                return out.json_value(&ratings);
            }
            out.header("IMDb ratings:");
            out.empty_note(ratings.is_empty());
            for info in ratings {
                println!(
                    "  tt{} {}: {}",
                    info.imdb_id,
                    info.title,
                    info.rating.as_deref().unwrap_or("-").green()
                );
            }
            Ok(())
        }
        LinksCommand::Directors(top) => out.pairs("Top directors:", &links()?.top_directors(top.n)),
        LinksCommand::Expensive(top) => {
            out.pairs("Most expensive movies:", &links()?.most_expensive(top.n))
        }
        LinksCommand::Profitable(top) => {
            out.pairs("Most profitable movies:", &links()?.most_profitable(top.n))
        }
        LinksCommand::Longest(top) => {
            out.pairs("Longest movies (minutes):", &links()?.longest(top.n))
        }
        LinksCommand::CostPerMinute(top) => out.pairs(
            "Budget per minute of runtime:",
            &links()?.top_cost_per_minute(top.n),
        ),
    }
}

/// Handle the 'financials' command
fn handle_financials(out: &Output, ticker: &str, field: &str, delay_secs: u64) -> Result<()> {
    let client = FinanceClient::new().with_delay(Duration::from_secs(delay_secs));
    let row = client
        .financial_row(ticker, field)
        .with_context(|| format!("Failed to fetch financials for {}", ticker))?;
    if out.json {
        return out.json_value(&row);
    }
    println!("{}", row);
    Ok(())
}
