pub const NOT_FOUND_TITLE: &str = "⚠️ No results found";
pub const NOT_FOUND_MSG: &str = "Sorry, I couldn't find any results for your query 😔";

/// Message text sent when the user taps the placeholder; the front end deletes it.
pub const NOT_FOUND_RESULT: &str = "not_found_result";

pub fn start_message(first_name: &str, user_id: i64) -> String {
    format!(
        "Hey [{first_name}](tg://user?id={user_id})!\n\n\
         I'm *Imarch* 🤖, a bot for searching any kind images on Google 🌐.\n\n\
         Send /help to get started and see the instructions 📚."
    )
}

pub fn help_message(bot_username: &str) -> String {
    format!(
        "📚 *Imarch Bot Usage*\n\n\
         To search for images, just type my username and the query you want to search 🔍\n\
         \n*Examples* 🧪 \n\n\
         🔸 `@{bot_username} cat` - search for images of cats\n\
         🔸 `@{bot_username} cat page:2` - search for images of cats on page 2\n\
         \n❕ Beside the query, you can add commands to change the search results behavior.\n\n\
         *Supported commands*:\n\n\
         🔸 `page:<number>`: Change the page of the search results (default: 1)\n\
         \n💡 *Note:*\n\n\
         The search results are paginated. You can change the page \
         of the search results by adding a command to the query.\n"
    )
}

/// The corrected query is shown in double quotes with Rust escaping; quotes
/// inside it stay unambiguous for the user.
pub fn spelling_message(corrected_query: &str) -> String {
    format!("💡 Did you mean {corrected_query:?} instead?")
}
