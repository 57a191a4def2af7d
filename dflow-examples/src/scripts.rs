//! Demo scripts. Transitions mix text matching with handler conditions from
//! [`dflow_telegram::conditions`].

use std::path::PathBuf;

use dflow_core::{
    message_of, Attachment, AttachmentGroup, Button, GroupItem, Keyboard, MediaKind, NodeLabel,
    Response, Result,
};
use dflow_telegram::conditions::{callback_data, callback_query_handler, message_handler};
use dflow_telegram::HandlerFilter;
use teloxide::types::Message;

use crate::script::{always, any, exact_match, Script, ScriptActor, Transition};

fn commands(names: &[&str]) -> HandlerFilter {
    HandlerFilter::new().commands(names.iter().copied())
}

/// Small talk and animals; commands and photos jump between flows.
pub fn basic_script() -> Result<ScriptActor> {
    Script::new(NodeLabel::new("root", "start"), NodeLabel::new("root", "fallback"))
        .global(
            Transition::to("root", "start", message_handler(commands(&["start"])))
                .with_priority(2.0),
        )
        .global(
            Transition::to(
                "root",
                "image",
                message_handler(HandlerFilter::new().content_types(["photo", "sticker"])),
            )
            .with_priority(2.0),
        )
        .global(
            Transition::to("animals", "have_pets", message_handler(commands(&["pets"])))
                .with_priority(2.0),
        )
        .global(
            Transition::to("animals", "like_animals", message_handler(commands(&["animals"])))
                .with_priority(2.0),
        )
        .node(
            "root",
            "start",
            "Hi",
            vec![Transition::to("small_talk", "ask_some_questions", exact_match("hi"))],
        )
        .node("root", "fallback", "Oops", vec![])
        .node(
            "root",
            "image",
            "Nice image",
            vec![Transition::to("root", "start", always())],
        )
        .node(
            "animals",
            "have_pets",
            "do you have pets?",
            vec![Transition::to("animals", "what_animal", exact_match("yes"))],
        )
        .node(
            "animals",
            "like_animals",
            "do you like it?",
            vec![Transition::to("animals", "what_animal", exact_match("yes"))],
        )
        .node(
            "animals",
            "what_animal",
            "what animals do you have?",
            vec![
                Transition::to("animals", "ask_about_color", exact_match("bird")),
                Transition::to("animals", "ask_about_breed", exact_match("dog")),
            ],
        )
        .node("animals", "ask_about_color", "what color is it", vec![])
        .node(
            "animals",
            "ask_about_breed",
            "what is this breed?",
            vec![
                Transition::to("animals", "ask_about_breed", exact_match("pereat")),
                Transition::to("animals", "tell_fact_about_breed", exact_match("bulldog")),
                Transition::to("animals", "ask_about_training", exact_match("i do not known")),
            ],
        )
        .node(
            "animals",
            "tell_fact_about_breed",
            "Bulldogs appeared in England as specialized bull-baiting dogs. ",
            vec![],
        )
        .node("animals", "ask_about_training", "Do you train your dog? ", vec![])
        .node(
            "small_talk",
            "ask_some_questions",
            "how are you",
            vec![
                Transition::to("small_talk", "ask_talk_about", exact_match("fine")),
                Transition::to("animals", "like_animals", exact_match("let's talk about animals")),
            ],
        )
        .node(
            "small_talk",
            "ask_talk_about",
            "what do you want to talk about",
            vec![Transition::to("animals", "like_animals", exact_match("dog"))],
        )
        .into_actor()
}

/// "What's 2 + 2?" answered with inline buttons.
pub fn callback_script() -> Result<ScriptActor> {
    let keyboard = Keyboard::inline(vec![
        Button::new("4").with_payload("4"),
        Button::new("5").with_payload("5"),
    ])
    .with_row_width(2);
    let answer = |data: &'static str| {
        callback_query_handler(HandlerFilter::new().func(move |u| callback_data(u) == Some(data)))
    };

    Script::new(NodeLabel::new("root", "start"), NodeLabel::new("root", "fallback"))
        .global(
            Transition::to("general", "keyboard", message_handler(commands(&["start", "restart"])))
                .with_priority(2.0),
        )
        .node(
            "root",
            "start",
            Response::text(""),
            vec![Transition::to("general", "keyboard", always())],
        )
        .node("root", "fallback", "Finishing test, send /restart command to restart", vec![])
        .node(
            "general",
            "keyboard",
            Response::text("What's 2 + 2?").with_ui(keyboard),
            vec![
                Transition::to("general", "success", answer("4")),
                Transition::to("general", "fail", answer("5")),
            ],
        )
        .node(
            "general",
            "success",
            Response::text("Success!").with_ui(Keyboard::Remove),
            vec![Transition::to("root", "fallback", always())],
        )
        .node(
            "general",
            "fail",
            Response::text("Incorrect answer, try again"),
            vec![Transition::to("general", "keyboard", always())],
        )
        .into_actor()
}

/// Asks for a picture; a photo (or JPEG document) gets one picture back, a sticker gets a
/// gallery of two.
pub fn pictures_script(picture: PathBuf) -> Result<ScriptActor> {
    let got_photo = || {
        any(vec![
            message_handler(HandlerFilter::new().content_types(["photo"])),
            message_handler(HandlerFilter::new().content_types(["document"]).func(|u| {
                message_of(u)
                    .and_then(Message::document)
                    .and_then(|d| d.mime_type.as_ref())
                    .is_some_and(|mime| mime.essence_str() == "image/jpeg")
            })),
        ])
    };
    let got_sticker = || message_handler(HandlerFilter::new().content_types(["sticker"]));
    let ask_transitions = || {
        vec![
            Transition::to("pics", "send_one", got_photo()).with_priority(1.1),
            Transition::to("pics", "send_many", got_sticker()),
            Transition::to("pics", "repeat", always()).with_priority(0.9),
        ]
    };

    Script::new(NodeLabel::new("root", "start"), NodeLabel::new("root", "fallback"))
        .node(
            "root",
            "start",
            Response::text(""),
            vec![Transition::to("pics", "ask_picture", always())],
        )
        .node(
            "root",
            "fallback",
            "Finishing test, send /restart command to restart",
            vec![Transition::to(
                "pics",
                "ask_picture",
                message_handler(commands(&["start", "restart"])),
            )],
        )
        .node("pics", "ask_picture", Response::text("Send me a picture"), ask_transitions())
        .node(
            "pics",
            "send_one",
            Response::text("Here's my picture!")
                .with_media(MediaKind::Image, Attachment::from_source(picture.clone())),
            vec![Transition::to("root", "fallback", always())],
        )
        .node(
            "pics",
            "send_many",
            Response::text("Look at my pictures").with_attachments(AttachmentGroup::new(vec![
                GroupItem::image(picture.clone()),
                GroupItem::image(picture),
            ])),
            vec![Transition::to("root", "fallback", always())],
        )
        .node(
            "pics",
            "repeat",
            "I cannot find the picture. Please, try again.",
            ask_transitions(),
        )
        .into_actor()
}
