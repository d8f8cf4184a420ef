use super::processor::User;

/* ChatHost is the narrow view the bot has of the chat client it runs in.
 * The host owns the connection: it delivers lines to the bot and sends its replies.
 */
pub trait ChatHost {
    // Sends a line to the channel.
    fn say(&mut self, text: &str);

    // Users currently in the channel, with their role prefixes.
    fn nicklist(&self) -> Vec<User>;

    // The nick the bot itself is connected with.
    fn own_nick(&self) -> String;

    fn nick_in_chat(&self, nick: &str) -> bool {
        self.nicklist().iter().any(|user| user.nick == nick)
    }
}

#[cfg(test)]
pub mod testing {
    use super::*;

    /* Records everything the bot says. */
    #[derive(Default)]
    pub struct TestHost {
        pub said: Vec<String>,
        pub users: Vec<User>,
    }

    impl TestHost {
        pub fn new() -> TestHost {
            TestHost::default()
        }

        pub fn with_user(mut self, prefix: &str, nick: &str) -> TestHost {
            self.users.push(User::new(prefix, nick));
            self
        }

        pub fn last(&self) -> Option<&str> {
            self.said.last().map(String::as_str)
        }

        pub fn take(&mut self) -> Vec<String> {
            std::mem::take(&mut self.said)
        }
    }

    impl ChatHost for TestHost {
        fn say(&mut self, text: &str) {
            self.said.push(text.to_string());
        }

        fn nicklist(&self) -> Vec<User> {
            self.users.clone()
        }

        fn own_nick(&self) -> String {
            "chanbot".to_string()
        }
    }
}
