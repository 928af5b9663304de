use crate::commands::{feed, graph, notifications, posts, users};

#[derive(Clone, Copy)]
pub struct ExampleGroup {
    pub title: &'static str,
    pub commands: &'static [&'static str],
}

#[derive(Clone, Copy)]
pub struct CommandExample {
    pub name: &'static str,
    pub groups: &'static [ExampleGroup],
}

pub fn command_examples() -> &'static [CommandExample] {
    &[
        CommandExample {
            name: "user",
            groups: users::EXAMPLES,
        },
        CommandExample {
            name: "follow",
            groups: graph::EXAMPLES,
        },
        CommandExample {
            name: "post",
            groups: posts::EXAMPLES,
        },
        CommandExample {
            name: "feed",
            groups: feed::EXAMPLES,
        },
        CommandExample {
            name: "notifications",
            groups: notifications::EXAMPLES,
        },
    ]
}
