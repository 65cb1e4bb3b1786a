pub mod error;
pub mod params;
pub mod peer;
pub mod prover;
pub mod transport;

/// Protocol phases, in wire order. Within a phase the commitment payload is
/// transmitted strictly before the opening and proof.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Phase {
    KeyGen,
    Round1,
    Round2,
}

#[cfg(test)]
mod tests {
    use super::params::PublicParameters;
    use super::peer::{PeerContribution, Round1Contribution, Round2Contribution};
    use super::prover::{ProverRoundState, Round1Public, Round1Secrets, Round2Public, Round2Secrets};
    use super::Phase;
    use crate::crypto::curve::{self, EcPoint};
    use crate::crypto::zkp::sigma::{self, SigmaTranscript};
    use crate::crypto::zkp::{EncDlogPredicate, EncDlogStatement, EncDlogWitness, ProofError};
    use crate::testutil;
    use num_bigint::BigInt;
    use num_integer::Integer;
    use rand::rngs::ThreadRng;
    use rand::thread_rng;

    // Round-1 relation configuration used for the session: knowledge that
    // u_i encrypts the discrete logarithm of a blinding point carried as
    // auxiliary statement data.
    fn round1_prove(
        params: &PublicParameters,
        public: &Round1Public,
        secrets: &Round1Secrets,
        rng: &mut ThreadRng,
    ) -> Result<(SigmaTranscript, Vec<BigInt>), ProofError> {
        let statement = EncDlogStatement {
            point: EcPoint::generator(),
            cipher: public.u_i.clone(),
        };
        let witness = EncDlogWitness {
            eta: secrets.rho_i.clone(),
            rand: secrets.rho_i_rnd.clone(),
        };
        let transcript = sigma::prove(&EncDlogPredicate, params, &statement, &witness, rng)?;
        let blind_point = EcPoint::scalar_base_mult(&secrets.rho_i);
        let (bx, by) = blind_point.coords().unwrap();
        Ok((transcript, vec![bx, by]))
    }

    fn round1_verify(
        params: &PublicParameters,
        contribution: &Round1Contribution,
        transcript: &SigmaTranscript,
    ) -> bool {
        if contribution.aux.len() != 2 {
            return false;
        }
        let point = match EcPoint::from_coords(&contribution.aux[0], &contribution.aux[1]) {
            Ok(p) => p,
            Err(_) => return false,
        };
        let statement = EncDlogStatement { point, cipher: contribution.u_i.clone() };
        sigma::verify(&EncDlogPredicate, params, &statement, transcript)
    }

    // Round-2 relation configuration: c_i encrypts the discrete logarithm
    // k_i of the revealed point R_i.
    fn round2_prove(
        params: &PublicParameters,
        public: &Round2Public,
        secrets: &Round2Secrets,
        rng: &mut ThreadRng,
    ) -> Result<(SigmaTranscript, Vec<BigInt>), ProofError> {
        let statement = EncDlogStatement {
            point: EcPoint::generator(),
            cipher: public.c_i.clone(),
        };
        let witness = EncDlogWitness {
            eta: secrets.k_i.clone(),
            rand: secrets.c_i_rnd.clone(),
        };
        let transcript = sigma::prove(&EncDlogPredicate, params, &statement, &witness, rng)?;
        Ok((transcript, Vec::new()))
    }

    fn round2_verify(
        params: &PublicParameters,
        contribution: &Round2Contribution,
        c_i: &BigInt,
        transcript: &SigmaTranscript,
    ) -> bool {
        let statement = EncDlogStatement {
            point: contribution.r_i.clone(),
            cipher: c_i.clone(),
        };
        sigma::verify(&EncDlogPredicate, params, &statement, transcript)
    }

    #[test]
    fn test_two_party_end_to_end() {
        let mut rng = thread_rng();
        let (sk, pk) = testutil::large_paillier();
        let params = testutil::params_with(&mut rng, pk);
        let q = curve::order();

        let mut alice = ProverRoundState::new();
        let mut bob = ProverRoundState::new();
        let mut alice_view_of_bob = PeerContribution::new();
        let mut bob_view_of_alice = PeerContribution::new();

        // --- Key generation: sample, commit, reveal, verify, combine ---
        alice.run_keygen(&params, &mut rng).unwrap();
        bob.run_keygen(&params, &mut rng).unwrap();

        bob_view_of_alice
            .receive_commitment(Phase::KeyGen, alice.keygen_commitment().unwrap())
            .unwrap();
        alice_view_of_bob
            .receive_commitment(Phase::KeyGen, bob.keygen_commitment().unwrap())
            .unwrap();

        bob_view_of_alice
            .receive_keygen_reveal(&params, alice.keygen_reveal().unwrap())
            .unwrap();
        alice_view_of_bob
            .receive_keygen_reveal(&params, bob.keygen_reveal().unwrap())
            .unwrap();

        let alice_pk = {
            let out = alice.finalize_keygen(&params, &[&alice_view_of_bob]).unwrap();
            out.public_key().clone()
        };
        let bob_pk = {
            let out = bob.finalize_keygen(&params, &[&bob_view_of_alice]).unwrap();
            out.public_key().clone()
        };

        // Both parties agree on the shared key, and it is the sum of the
        // individual contributions.
        assert_eq!(alice_pk, bob_pk);
        let y_sum = alice
            .keygen_phase()
            .unwrap()
            .y_share()
            .add(alice_view_of_bob.keygen().unwrap().y_share());
        assert_eq!(alice_pk, y_sum);

        // The combined ciphertext decrypts to the sum of the secret shares;
        // a peer's view carries only public values, never the share itself.
        let enc_x = alice.keygen_output().unwrap().enc_x().clone();
        let x_sum = alice.secret_share().unwrap() + bob.secret_share().unwrap();
        assert_eq!(sk.decrypt(&enc_x).unwrap(), x_sum);

        // --- Round 1: MtA setup ---
        alice.run_round1(&params, &mut rng, round1_prove).unwrap();
        bob.run_round1(&params, &mut rng, round1_prove).unwrap();

        bob_view_of_alice
            .receive_commitment(Phase::Round1, alice.round1_commitment().unwrap())
            .unwrap();
        alice_view_of_bob
            .receive_commitment(Phase::Round1, bob.round1_commitment().unwrap())
            .unwrap();

        bob_view_of_alice
            .receive_round1_reveal(&params, alice.round1_reveal().unwrap(), round1_verify)
            .unwrap();
        alice_view_of_bob
            .receive_round1_reveal(&params, bob.round1_reveal().unwrap(), round1_verify)
            .unwrap();

        let paillier = params.paillier();
        let alice_r1 = alice.round1_phase().unwrap().public().clone();
        let bob_r1 = alice_view_of_bob.round1().unwrap().clone();

        let u_combined = paillier.homo_add(&alice_r1.u_i, &bob_r1.u_i).unwrap();
        let v_combined = paillier.homo_add(&alice_r1.v_i, &bob_r1.v_i).unwrap();

        // The blinding shares convert multiplicatively: v decrypts to
        // x * (rho_1 + rho_2).
        let rho = sk.decrypt(&u_combined).unwrap();
        assert_eq!(sk.decrypt(&v_combined).unwrap(), &x_sum * &rho);

        // --- Round 2: finalization ---
        alice
            .run_round2(&params, &mut rng, &u_combined, round2_prove)
            .unwrap();
        bob.run_round2(&params, &mut rng, &u_combined, round2_prove)
            .unwrap();

        bob_view_of_alice
            .receive_commitment(Phase::Round2, alice.round2_commitment().unwrap())
            .unwrap();
        alice_view_of_bob
            .receive_commitment(Phase::Round2, bob.round2_commitment().unwrap())
            .unwrap();

        let bob_c_i = bob_r1.c_i.clone();
        bob_view_of_alice
            .receive_round2_reveal(&params, alice.round2_reveal().unwrap(), |p, c, t| {
                round2_verify(p, c, &alice_r1.c_i, t)
            })
            .unwrap();
        alice_view_of_bob
            .receive_round2_reveal(&params, bob.round2_reveal().unwrap(), |p, c, t| {
                round2_verify(p, c, &bob_c_i, t)
            })
            .unwrap();

        let alice_r2 = alice.round2_phase().unwrap().public().clone();
        let bob_r2 = alice_view_of_bob.round2().unwrap().clone();

        // R = (k_1 + k_2) * G
        let k_sum = sk.decrypt(&alice_r1.c_i).unwrap() + sk.decrypt(&bob_r1.c_i).unwrap();
        assert_eq!(alice_r2.r_i.add(&bob_r2.r_i), EcPoint::scalar_base_mult(&k_sum));

        // The combined masked share decrypts to k * rho up to multiples of q.
        let w_combined = paillier.homo_add(&alice_r2.w_i, &bob_r2.w_i).unwrap();
        let k_rho = (&k_sum * &rho).mod_floor(q);
        assert_eq!(sk.decrypt(&w_combined).unwrap().mod_floor(q), k_rho);
    }

    #[test]
    fn test_rejected_peer_blocks_combination() {
        let mut rng = thread_rng();
        let params = testutil::small_params(&mut rng);

        let mut alice = ProverRoundState::new();
        let mut bob = ProverRoundState::new();
        let mut alice_view_of_bob = PeerContribution::new();

        alice.run_keygen(&params, &mut rng).unwrap();
        bob.run_keygen(&params, &mut rng).unwrap();

        alice_view_of_bob
            .receive_commitment(Phase::KeyGen, bob.keygen_commitment().unwrap())
            .unwrap();

        // Bob's reveal is tampered in flight; his contribution is rejected
        // and the local party must not combine with it.
        let mut reveal = bob.keygen_reveal().unwrap();
        reveal.proof.s1 += BigInt::from(1u64);
        assert!(alice_view_of_bob
            .receive_keygen_reveal(&params, reveal)
            .is_err());

        assert!(alice.finalize_keygen(&params, &[&alice_view_of_bob]).is_err());
    }
}
