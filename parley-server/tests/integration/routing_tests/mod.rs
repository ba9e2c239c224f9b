mod test_sender_identity_enforced;
mod test_two_party_unaddressed_routing;
