//! Subcommand implementations.

use std::fmt::Display;

use anyhow::Context;
use anyhow::bail;
use bookshelf_lib::BookshelfClient;
use bookshelf_lib::bookshelf_forms::Form;
use bookshelf_lib::forms;
use bookshelf_lib::model::Book;
use bookshelf_lib::model::BookCategory;
use bookshelf_lib::router::Navigation;
use bookshelf_lib::router::Router;
use bookshelf_lib::store::AuthStore;
use bookshelf_lib::store::BookStore;
use log::info;

use crate::config::AddArgs;
use crate::config::Command;

pub async fn run(command: Command, client: BookshelfClient) -> anyhow::Result<()> {
    let mut auth = AuthStore::load(client.clone())
        .await
        .context("Failed to read the stored session")?;
    let router = Router::default();

    match command {
        Command::Login { username, password } => login(&mut auth, username, password).await,
        Command::Logout => {
            auth.logout().await?;
            println!("Signed out");
            Ok(())
        }
        Command::Whoami => {
            if auth.check_auth().await {
                println!("{} ({})", auth.username(), role(&auth));
            } else {
                println!("Not signed in");
            }
            Ok(())
        }
        Command::Books { search, category } => {
            let mut store = BookStore::new(client);
            store.fetch_books().await?;
            store.set_search_query(search.unwrap_or_default());
            store.set_category(category);
            print_books(&store.filtered_books());
            Ok(())
        }
        Command::Stats => {
            let mut store = BookStore::new(client);
            store.fetch_books().await?;
            let stats = store.category_stats();
            for category in BookCategory::ALL {
                let count = stats.get(&category).copied().unwrap_or(0);
                println!("{:<12} {}", category.label(), count);
            }
            println!("{:<12} {}", "Total", store.books().len());
            Ok(())
        }
        Command::Show { id } => {
            let mut store = BookStore::new(client);
            store.fetch_book(id).await?;
            if let Some(book) = store.current_book() {
                print_book(book);
            }
            Ok(())
        }
        Command::Add(args) => {
            require_access(&router, &mut auth, "/admin/books/new").await?;
            let book = book_from_args(args)?;
            let created = BookStore::new(client).create_book(&book).await?;
            info!("Created book {:?}", created.id);
            print_book(&created);
            Ok(())
        }
        Command::Delete { id } => {
            require_access(&router, &mut auth, "/admin").await?;
            BookStore::new(client).delete_book(id).await?;
            println!("Deleted book {}", id);
            Ok(())
        }
        Command::Route { path } => {
            match router.guard(&path, &mut auth).await {
                Navigation::Proceed => println!("proceed"),
                Navigation::NotFound => println!("not found"),
                redirect => {
                    println!("redirect {}", redirect.location().unwrap_or_default());
                }
            }
            Ok(())
        }
    }
}

async fn login(auth: &mut AuthStore, username: String, password: String) -> anyhow::Result<()> {
    let mut form = forms::login_form()?;
    form.set("username", username)?;
    form.set("password", password)?;
    check_form(&mut form)?;

    let credentials = forms::credentials_from_form(&form)?;
    auth.login(&credentials).await.context("Sign-in failed")?;
    println!("Signed in as {} ({})", auth.username(), role(auth));
    Ok(())
}

/// Runs the route guard for `path` and fails unless it lets the user through.
async fn require_access(router: &Router, auth: &mut AuthStore, path: &str) -> anyhow::Result<()> {
    match router.guard(path, auth).await {
        Navigation::Proceed => Ok(()),
        Navigation::Redirect { route, .. } if route == "login" => {
            bail!("Not signed in, run `bookshelf login` first")
        }
        Navigation::Redirect { .. } => bail!("Administrator access required"),
        Navigation::NotFound => bail!("Unknown route {}", path),
    }
}

/// Fills the book form from command-line arguments.
///
/// Categories are matched case-insensitively; an unknown one is left for the
/// form to reject.
fn book_from_args(args: AddArgs) -> anyhow::Result<Book> {
    let category = match args.category.parse::<BookCategory>() {
        Ok(category) => category.as_str().to_string(),
        Err(_) => args.category,
    };

    let mut form = forms::book_form(&Book::default())?;
    form.set("title", args.title)?;
    form.set("author", args.author)?;
    form.set("isbn", args.isbn)?;
    form.set("price", args.price)?;
    form.set("category", category)?;
    form.set("publicationYear", args.year)?;
    form.set("description", args.description)?;
    check_form(&mut form)?;

    Ok(forms::book_from_form(&form, None)?)
}

fn check_form(form: &mut Form) -> anyhow::Result<()> {
    if form.validate_all() {
        return Ok(());
    }
    for error in form.result().errors() {
        eprintln!("  {}: {}", error.field, error.message);
    }
    bail!("Invalid input")
}

fn role(auth: &AuthStore) -> &'static str {
    if auth.is_admin() { "admin" } else { "user" }
}

fn print_books(books: &[&Book]) {
    if books.is_empty() {
        println!("No books found");
        return;
    }
    for book in books {
        println!(
            "{:>5}  {:<40}  {:<25}  {:<10}  {:>8.2}",
            book.id.map(|id| id.to_string()).unwrap_or_default(),
            book.title,
            book.author,
            book.category.label(),
            book.price
        );
    }
}

fn or_dash<T: Display>(value: Option<T>) -> String {
    value.map_or_else(|| "-".to_string(), |v| v.to_string())
}

fn print_book(book: &Book) {
    println!("{}", book.title);
    println!("  id:          {}", or_dash(book.id));
    println!("  author:      {}", book.author);
    println!("  isbn:        {}", book.isbn);
    println!("  price:       {:.2}", book.price);
    println!("  category:    {}", book.category.label());
    println!("  year:        {}", or_dash(book.publication_year));
    println!("  description: {}", or_dash(book.description.as_deref()));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args() -> AddArgs {
        AddArgs {
            title: "Candide".to_string(),
            author: "Voltaire".to_string(),
            isbn: "978-2070360000".to_string(),
            price: 4.5,
            year: Some(1759),
            category: "roman".to_string(),
            description: None,
        }
    }

    #[test]
    fn test_valid_args_become_a_book() {
        let book = book_from_args(args()).unwrap();
        assert_eq!(book.id, None);
        assert_eq!(book.category, BookCategory::Roman);
        assert_eq!(book.publication_year, Some(1759));
        assert_eq!(book.description, None);
    }

    #[test]
    fn test_invalid_args_are_rejected_before_sending() {
        let mut bad = args();
        bad.isbn = "2070360000".to_string();
        assert!(book_from_args(bad).is_err());

        let mut bad = args();
        bad.category = "comics".to_string();
        assert!(book_from_args(bad).is_err());

        let mut bad = args();
        bad.price = 0.0;
        assert!(book_from_args(bad).is_err());
    }

    #[test]
    fn test_infinite_price_fails_validation_not_conversion() {
        let mut bad = args();
        bad.price = f64::INFINITY;
        let err = book_from_args(bad).unwrap_err();
        assert_eq!(err.to_string(), "Invalid input");
    }

    #[test]
    fn test_or_dash() {
        assert_eq!(or_dash(Some(3)), "3");
        assert_eq!(or_dash::<i32>(None), "-");
    }
}
