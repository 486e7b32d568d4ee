pub mod add_book_cmd;
pub mod get_book_cmd;
pub mod recommend_book_cmd;
pub mod search_books_cmd;
