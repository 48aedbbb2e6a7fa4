//! Whole-game tests against the bundled hotel scenario.

use advent_core::{Flag, Money};
use advent_fiction::{Mode, ScenarioFile, Session, SessionConfig};

const HOTEL: &str = include_str!("../../advent-cli/worlds/hotel.json");

fn hotel() -> Session {
    ScenarioFile::from_json(HOTEL)
        .unwrap()
        .into_session(SessionConfig::default())
        .unwrap()
}

fn inventory_keys(session: &Session) -> Vec<String> {
    let world = session.world();
    let inventory = world.inventory_of(session.player().as_str()).unwrap();
    world
        .entity(inventory.as_str())
        .unwrap()
        .as_container()
        .unwrap()
        .items
        .iter()
        .map(|key| key.as_str().to_string())
        .collect()
}

/// Play the opening moves that get the player into the hallway.
fn reach_hallway(session: &mut Session) {
    session.process("open nightstand").unwrap();
    session.process("take key").unwrap();
    let lines = session.process("go north").unwrap();
    assert_eq!(lines[0], "The Door opens with the Brass Key.");
}

#[test]
fn intro_describes_the_first_room() {
    let session = hotel();
    let intro = session.intro().unwrap();
    assert_eq!(intro[0], "The Long Night at the Hotel Grand");
    assert!(intro.iter().any(|l| l.starts_with("You are in the Room 201:")));
    assert!(intro.iter().any(|l| l.starts_with("To the NORTH is the Door")));
}

#[test]
fn take_and_drop_round_trip() {
    let mut session = hotel();
    assert_eq!(session.process("take lamp").unwrap(), ["Taken."]);
    assert_eq!(inventory_keys(&session), ["lamp"]);

    assert_eq!(
        session.process("take the dented lamp").unwrap(),
        ["You've already taken the Lamp! Check your INV"]
    );

    assert_eq!(session.process("drop lamp").unwrap(), ["Dropped it like it's hot."]);
    assert!(inventory_keys(&session).is_empty());
    let lamp = session.world().entity("lamp").unwrap();
    assert_eq!(lamp.location.as_ref().map(|k| k.as_str()), Some("room-201"));
}

#[test]
fn nightstand_redirects_to_its_drawer() {
    let mut session = hotel();
    let lines = session.process("open nightstand").unwrap();
    assert!(lines[0].starts_with("You look inside the"));
    assert!(lines.iter().any(|l| l.contains("Brass Key")));
    assert!(session.world().entity("drawer").unwrap().has_flag(Flag::Open));

    session.process("close wobbly nightstand").unwrap();
    assert!(!session.world().entity("drawer").unwrap().has_flag(Flag::Open));
}

#[test]
fn locked_door_needs_the_brass_key() {
    let mut session = hotel();
    assert_eq!(
        session.process("go north").unwrap(),
        ["The Door is locked and you don't have the Brass Key."]
    );

    // the key is hidden until the drawer is open
    assert_eq!(session.process("take key").unwrap(), ["I don't see a brass key here!"]);

    reach_hallway(&mut session);
    let room = session.world().room_of(session.player().as_str()).unwrap();
    assert_eq!(room.as_str(), "hallway");
    assert!(inventory_keys(&session).contains(&"brass-key".to_string()));
}

#[test]
fn locked_minibar_opens_with_the_key() {
    let mut session = hotel();
    assert_eq!(
        session.process("open minibar").unwrap(),
        ["The Minibar is locked and you don't have the key."]
    );
    assert!(!session.world().entity("minibar").unwrap().has_flag(Flag::Open));

    session.process("open nightstand").unwrap();
    session.process("take brass key").unwrap();
    let lines = session.process("open squat minibar").unwrap();
    assert_eq!(lines[0], "You unlock the Minibar with the Brass Key.");
    assert!(lines.iter().any(|l| l.contains("Coins")));
    let minibar = session.world().entity("minibar").unwrap();
    assert!(minibar.has_flag(Flag::Open));
    assert!(!minibar.has_flag(Flag::Locked));
    // the key is kept
    assert!(inventory_keys(&session).contains(&"brass-key".to_string()));
}

#[test]
fn loose_coins_become_money() {
    let mut session = hotel();
    session.process("open drawer").unwrap();
    session.process("take key").unwrap();
    session.process("open minibar").unwrap();
    assert_eq!(
        session.process("take coins").unwrap(),
        ["You pocket the Coins. You now have $0.75."]
    );
    assert_eq!(session.money(), Money::from_cents(75));
    assert!(!inventory_keys(&session).contains(&"coins".to_string()));
}

#[test]
fn putting_into_inventory_is_taking() {
    let mut session = hotel();
    assert_eq!(session.process("put lamp in inventory").unwrap(), ["Taken."]);
    assert_eq!(inventory_keys(&session), ["lamp"]);
}

#[test]
fn vending_requires_money_then_dispenses_once() {
    let mut session = hotel();
    reach_hallway(&mut session);

    let lines = session.process("use machine").unwrap();
    assert_eq!(lines[0], "*** WELCOME TO SNACK-O-MATIC 3000 ***");
    assert!(matches!(session.mode(), Mode::Vending { .. }));

    let lines = session.process("1").unwrap();
    assert!(lines.iter().any(|l| l == "You need $0.50 but only have $0.00"));
    assert_eq!(session.vendor("vending-machine").unwrap().products[0].stock, 99);

    session.add_money(Money::from_cents(50)).unwrap();
    let before = inventory_keys(&session).len();
    let lines = session.process("1").unwrap();
    assert!(lines.iter().any(|l| l == "You bought Fast Eddie's for $0.50"));
    assert_eq!(session.money(), Money::ZERO);
    assert_eq!(session.vendor("vending-machine").unwrap().products[0].stock, 98);
    assert_eq!(inventory_keys(&session).len(), before + 1);
    assert!(inventory_keys(&session).contains(&"fast-eddies-1".to_string()));

    session.process("leave").unwrap();
    assert_eq!(session.mode(), &Mode::Exploring);

    // purchased items are known to the parser
    assert_eq!(session.process("drop chips").unwrap(), ["Dropped it like it's hot."]);
}

#[test]
fn second_purchase_stays_nameable_after_the_first_is_gone() {
    let mut session = hotel();
    reach_hallway(&mut session);
    session.add_money(Money::from_cents(150)).unwrap();
    session.process("use machine").unwrap();
    for _ in 0..3 {
        session.process("1").unwrap();
    }
    session.process("leave").unwrap();

    assert_eq!(session.process("eat chips").unwrap(), ["You eat the Fast Eddie's. Not bad."]);
    assert!(!inventory_keys(&session).contains(&"fast-eddies-1".to_string()));

    assert_eq!(session.process("drop chips").unwrap(), ["Dropped it like it's hot."]);
    let dropped = session.world().entity("fast-eddies-2").unwrap();
    assert_eq!(dropped.location.as_ref().map(|k| k.as_str()), Some("hallway"));

    // the bag on the floor is still in reach
    assert_eq!(session.process("eat chips").unwrap(), ["You eat the Fast Eddie's. Not bad."]);
    assert!(session.world().contains_item(advent_core::NOWHERE, "fast-eddies-2"));
    assert!(inventory_keys(&session).contains(&"fast-eddies-3".to_string()));

    assert_eq!(session.process("drop crinkly bag").unwrap(), ["Dropped it like it's hot."]);
    assert!(!inventory_keys(&session).iter().any(|k| k.starts_with("fast-eddies")));
}

#[test]
fn pocket_change_pays_for_chips() {
    let mut session = hotel();
    reach_hallway(&mut session);
    session.process("use vending machine").unwrap();

    let lines = session.process("insert money").unwrap();
    assert_eq!(lines[0], "*CLINK* Found some loose change in your pocket!");
    assert_eq!(lines[1], "You now have $0.50");
    assert_eq!(lines[2], "Hint: the minibar in your room might have more.");

    let lines = session.process("2").unwrap();
    assert!(lines.iter().any(|l| l == "You need $2.50 but only have $0.50"));
}

#[test]
fn genie_conversation_runs_to_an_ending() {
    let mut session = hotel();
    let lines = session.process("rub lamp").unwrap();
    assert!(lines[0].starts_with("A genie billows out of the lamp."));
    assert_eq!(session.mode(), &Mode::Conversation { dialogue: "genie".into() });

    let lines = session.process("2").unwrap();
    assert!(lines[0].contains("genie of Room 201"));

    assert_eq!(
        session.process("9").unwrap(),
        ["Please enter a number between 1 and 1, or 'quit' to end the conversation."]
    );

    session.process("1").unwrap();
    let lines = session.process("1").unwrap();
    assert_eq!(lines.len(), 1);
    assert!(lines[0].starts_with("The genie points north."));
    assert_eq!(session.mode(), &Mode::Exploring);
}

#[test]
fn terminal_node_ends_conversation_despite_choices() {
    let mut session = hotel();
    session.process("rub lamp").unwrap();
    session.process("3").unwrap();
    assert_eq!(session.mode(), &Mode::Exploring);
    assert!(session.dialogue("genie").unwrap().is_finished());
}

#[test]
fn couch_and_handprints_have_their_own_replies() {
    let mut session = hotel();
    let lines = session.process("sit couch").unwrap();
    assert!(lines[0].starts_with("You sit down on the"));
    assert_eq!(
        session.world().entity("couch").unwrap().descriptions.current_tag(),
        &advent_core::DescriptionTag::Sitting
    );

    let lines = session.process("wipe greasy handprints").unwrap();
    assert_eq!(
        lines,
        [
            "You wipe the mirror with your sleeve.",
            "The handprints smear into one big handprint. Progress."
        ]
    );
}

#[test]
fn turns_advance_urgency_but_typos_do_not() {
    let mut session = hotel();
    assert_eq!(session.urgency().level(), 45);

    session.process("look").unwrap();
    assert_eq!(session.turns(), 1);
    assert_eq!(session.urgency().level(), 47);

    let lines = session.process("lok").unwrap();
    assert_eq!(lines.last().map(String::as_str), Some("Did you mean 'look'?"));
    assert_eq!(session.turns(), 1);
    assert_eq!(session.urgency().level(), 47);
}

#[test]
fn quitting_ends_the_game() {
    let mut session = hotel();
    assert_eq!(session.process("quit").unwrap(), ["Thanks for playing! Goodbye!"]);
    assert!(session.is_finished());
    assert_eq!(session.process("look").unwrap(), ["The game is over."]);
}
